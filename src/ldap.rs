use ldapprov::*;
use std::path::PathBuf;
use structopt::StructOpt;

include!("./ldap_opt.rs");

fn exit_with(e: LdapError, json: bool) -> ! {
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&e).expect("CRITICAL: Serialisation Fault")
        );
    } else {
        error!("{}", e);
    }
    std::process::exit(e.exit_code());
}

async fn create(opts: CreateOptions, json: bool) -> Result<(), LdapError> {
    let config = LdapConfig::from_env()?;
    let template = DnTemplate::new(&opts.dn_format)?;

    let tree = descriptor::load_tree(&opts.tree_file)?;
    let users = descriptor::load_users(&opts.user_file)?;

    let client = LdapClient::connect(&config).await?;
    let results = sync::provision(client, &tree, &users, &template).await?;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&results).expect("CRITICAL: Serialisation Fault")
        );
    } else {
        let (mut created, mut updated, mut failed) = (0, 0, 0);
        for r in results.iter() {
            match r.outcome {
                UserOutcome::Created => created += 1,
                UserOutcome::Updated => updated += 1,
                UserOutcome::Failed(_) => failed += 1,
            }
        }
        info!(created, updated, failed, "User synchronisation finished");
    }
    Ok(())
}

async fn list(opts: ListOptions, json: bool) -> Result<(), LdapError> {
    let config = LdapConfig::from_env()?;
    let base = opts
        .base
        .unwrap_or_else(|| list::DEFAULT_SEARCH_BASE.to_string());

    let client = LdapClient::connect(&config).await?;
    if !json {
        println!("Directory Structure:");
    }
    list::visit_entries(client, &base, |entry| {
        if json {
            println!(
                "{}",
                serde_json::to_string(entry).expect("CRITICAL: Serialisation Fault")
            );
        } else {
            println!("{}", entry);
        }
    })
    .await?;
    Ok(())
}

fn create_default_files(opts: DefaultFilesOptions, json: bool) -> Result<(), LdapError> {
    let written = descriptor::write_default_files(&opts.path)?;
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&written).expect("CRITICAL: Serialisation Fault")
        );
    } else {
        for path in written {
            println!("{}", path.display());
        }
    }
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let opt = LdapOpt::from_args();
    ldapprov::start_tracing(opt.verbose);
    debug!("ldap provisioning utility");

    let json = opt.json;
    let res = match opt.action {
        LdapAction::Create(options) => create(options, json).await,
        LdapAction::List(options) => list(options, json).await,
        LdapAction::CreateDefaultFiles(options) => create_default_files(options, json),
    };

    if let Err(e) = res {
        exit_with(e, json);
    }
}
