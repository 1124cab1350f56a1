//! `kdb-admin`: inspect roles and try logins against a kernel security
//! configuration without starting the kernel.

use std::path::PathBuf;

use anyhow::{Context, bail};
use authn_resolver_sdk::{AuthNResolverClient, Credentials};
use clap::{Parser, Subcommand};
use dbms_procedures_sdk::DbmsProceduresClient;
use kdb_security::{DatabaseName, LoginContext, OperationClass, Resource, Scope, SecurityContext};
use kernel_security::{KernelSecurity, KernelSecurityConfig};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "kdb-admin", version, about = "Kernel security administration")]
struct Cli {
    /// YAML configuration file. `KDB_*` environment variables override it.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log filter, e.g. `debug` or `kdb_security=trace`.
    #[arg(long, global = true, default_value = "warn")]
    log: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, clap::Args)]
struct LoginArgs {
    /// Principal name for password login.
    #[arg(short, long, requires = "password", conflicts_with = "token")]
    user: Option<String>,

    #[arg(short, long)]
    password: Option<String>,

    /// Bearer token.
    #[arg(short, long)]
    token: Option<String>,

    /// Database to scope the context to. DBMS-wide when omitted.
    #[arg(short, long)]
    database: Option<String>,
}

#[derive(Subcommand)]
enum Command {
    /// Print the configured role table.
    Roles,

    /// Authenticate and print the resulting security context.
    Login(LoginArgs),

    /// Print whether a login may perform an operation.
    Check {
        #[command(flatten)]
        login: LoginArgs,

        /// Operation class: read, write, schema or admin.
        #[arg(long)]
        op: OperationClass,
    },
}

fn init_tracing(filter: &str) -> anyhow::Result<()> {
    let filter = EnvFilter::try_new(filter).context("invalid log filter")?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!(e))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log)?;

    let cfg = KernelSecurityConfig::load(cli.config.as_deref()).context("loading configuration")?;
    let kernel = KernelSecurity::init(&cfg).context("initializing kernel security")?;

    match cli.command {
        Command::Roles => print_roles(&kernel),
        Command::Login(args) => {
            let ctx = authorize(&kernel, &args).await?;
            print_context(&ctx)
        }
        Command::Check { login, op } => {
            let ctx = authorize(&kernel, &login).await?;
            let resource = match ctx.scope() {
                Scope::Dbms => Resource::Dbms,
                Scope::Database(name) => Resource::Database(name.clone()),
            };
            let allowed = ctx.allows(op, &resource);
            println!(
                "{}",
                serde_json::json!({
                    "subject": ctx.subject().name(),
                    "op": op.as_str(),
                    "resource": resource.to_string(),
                    "allowed": allowed,
                })
            );
            Ok(())
        }
    }
}

fn print_roles(kernel: &KernelSecurity) -> anyhow::Result<()> {
    let rows = kernel
        .procedures()
        .list_roles(&SecurityContext::system())
        .context("listing roles")?;
    println!("{}", serde_json::to_string_pretty(&rows)?);
    Ok(())
}

fn print_context(ctx: &SecurityContext) -> anyhow::Result<()> {
    let summary = serde_json::json!({
        "subject": ctx.subject().name(),
        "anonymous": ctx.is_anonymous(),
        "admin": ctx.is_admin(),
        "scope": ctx.scope().to_string(),
        "roles": ctx.roles(),
        "access_mode": ctx.access_mode().to_string(),
    });
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

fn credentials(args: &LoginArgs) -> anyhow::Result<Credentials> {
    Ok(match (&args.user, &args.password, &args.token) {
        (Some(user), Some(password), None) => Credentials::basic(user.as_str(), password.as_str()),
        (None, None, Some(token)) => Credentials::bearer(token.as_str()),
        (None, None, None) => Credentials::None,
        _ => bail!("give either --user with --password, or --token"),
    })
}

fn scope(args: &LoginArgs) -> anyhow::Result<Scope> {
    Ok(match &args.database {
        Some(name) => Scope::Database(DatabaseName::new(name).context("invalid database name")?),
        None => Scope::Dbms,
    })
}

async fn authorize(kernel: &KernelSecurity, args: &LoginArgs) -> anyhow::Result<SecurityContext> {
    let credentials = credentials(args)?;
    let scope = scope(args)?;

    let login: LoginContext = kernel.authn().login(&credentials).await;
    if login.is_anonymous() {
        tracing::warn!("authentication failed, continuing as anonymous");
    }
    Ok(login.authorize(&scope))
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    fn login_args(argv: &[&str]) -> LoginArgs {
        let cli = Cli::try_parse_from(["kdb-admin", "login"].iter().chain(argv)).unwrap();
        match cli.command {
            Command::Login(args) => args,
            _ => unreachable!(),
        }
    }

    #[test]
    fn user_and_password_select_basic_credentials() {
        let creds = credentials(&login_args(&["--user", "alice", "--password", "pw"])).unwrap();
        assert_eq!(creds.kind(), "basic");
        assert_eq!(creds.claimed_principal(), Some("alice"));
    }

    #[test]
    fn token_selects_bearer_and_nothing_selects_none() {
        assert_eq!(credentials(&login_args(&["--token", "t0k"])).unwrap().kind(), "bearer");
        assert_eq!(credentials(&login_args(&[])).unwrap().kind(), "none");
    }

    #[test]
    fn password_without_user_is_rejected() {
        let err = credentials(&login_args(&["--password", "pw"])).unwrap_err();
        assert!(err.to_string().contains("--user with --password"));
        assert!(credentials(&login_args(&["--password", "pw", "--token", "t"])).is_err());
    }

    #[test]
    fn conflicting_flags_are_rejected_by_the_parser() {
        assert!(Cli::try_parse_from(["kdb-admin", "login", "--user", "a", "--token", "t"]).is_err());
        assert!(Cli::try_parse_from(["kdb-admin", "login", "--user", "a"]).is_err());
    }

    #[test]
    fn database_selects_scope() {
        assert_eq!(scope(&login_args(&[])).unwrap(), Scope::Dbms);
        assert_eq!(
            scope(&login_args(&["--database", "movies"])).unwrap(),
            Scope::database("movies").unwrap()
        );
        assert!(scope(&login_args(&["--database", "9lives"])).is_err());
    }
}
