
#[derive(Debug, StructOpt)]
struct CreateOptions {
    #[structopt(short = "d", long = "dn", default_value = "cn=%s,CN=Users,DC=global,DC=domain,DC=net")]
    /// Format for user DN, %s will be replaced with username
    dn_format: String,

    #[structopt(short = "t", long = "tree-file", default_value = "tree.json")]
    /// File path to tree file
    tree_file: PathBuf,

    #[structopt(short = "u", long = "user-file", default_value = "users.json")]
    /// File path to users file
    user_file: PathBuf,
}

#[derive(Debug, StructOpt)]
struct ListOptions {
    #[structopt(short = "b", long = "base")]
    /// Base DN to start searching [default: DC=global,DC=domain,DC=net]
    base: Option<String>,
}

#[derive(Debug, StructOpt)]
struct DefaultFilesOptions {
    #[structopt(short = "p", long = "files-path", default_value = ".")]
    /// Path to create files
    path: PathBuf,
}

#[derive(Debug, StructOpt)]
enum LdapAction {
    /// Creates an ldap tree and users
    Create(CreateOptions),
    /// List the entries below a base DN
    List(ListOptions),
    /// Creates default users.json and tree.json files
    CreateDefaultFiles(DefaultFilesOptions),
}

#[derive(Debug, StructOpt)]
#[structopt(author, name="ldap")]
/// Ldap management commands. The directory server and bind credentials are read
/// from AD_HOST, AD_PORT, AD_DN and AD_PWD.
struct LdapOpt {
    #[structopt(short, long)]
    /// Display extended infomation during runtime.
    verbose: bool,

    #[structopt(short = "j", long = "json")]
    /// Print results and errors as json.
    json: bool,

    #[structopt(subcommand)]
    /// The ldap action to perform
    action: LdapAction
}
