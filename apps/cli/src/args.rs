use std::env;

use pruner_core::Plan;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Command {
    #[default]
    Serve,
    ProjectAdd {
        name: String,
        plan: Plan,
    },
    ProjectPlan {
        id: String,
        plan: Plan,
    },
    RunMaintenance,
}

#[derive(Debug, Default)]
pub struct CliArgs {
    pub command: Command,
    pub port: Option<u16>,
    pub host: Option<String>,
    pub data_dir: Option<String>,
    pub no_scheduler: bool,
}

pub fn parse_args() -> Result<CliArgs, String> {
    parse_args_from(env::args().skip(1))
}

pub fn parse_args_from(args: impl IntoIterator<Item = String>) -> Result<CliArgs, String> {
    let mut args = args.into_iter();
    let mut parsed = CliArgs::default();
    let mut positional: Vec<String> = Vec::new();
    let mut plan_flag: Option<Plan> = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--port" => {
                let value = flag_value(&mut args, "--port")?;
                let port = value
                    .parse::<u16>()
                    .map_err(|_| format!("invalid port value: {value}"))?;
                parsed.port = Some(port);
            }
            "--host" => parsed.host = Some(flag_value(&mut args, "--host")?),
            "--data-dir" => parsed.data_dir = Some(flag_value(&mut args, "--data-dir")?),
            "--plan" => plan_flag = Some(parse_plan(&flag_value(&mut args, "--plan")?)?),
            "--no-scheduler" => {
                parsed.no_scheduler = true;
            }
            "--help" | "-h" => {
                print_help();
                std::process::exit(0);
            }
            value if value.starts_with("--") => {
                return Err(format!("unknown argument: {arg}"));
            }
            _ => positional.push(arg),
        }
    }

    let mut positional = positional.into_iter();
    parsed.command = match positional.next().as_deref() {
        None | Some("serve") => Command::Serve,
        Some("project-add") => {
            let name = positional
                .next()
                .ok_or_else(|| "project-add requires a name".to_string())?;
            Command::ProjectAdd {
                name,
                plan: plan_flag.unwrap_or(Plan::Free),
            }
        }
        Some("project-plan") => {
            let id = positional
                .next()
                .ok_or_else(|| "project-plan requires a project id".to_string())?;
            let plan = positional
                .next()
                .ok_or_else(|| "project-plan requires a plan".to_string())?;
            Command::ProjectPlan {
                id,
                plan: parse_plan(&plan)?,
            }
        }
        Some("run-maintenance") => Command::RunMaintenance,
        Some(other) => return Err(format!("unknown command: {other}")),
    };
    if let Some(extra) = positional.next() {
        return Err(format!("unexpected argument: {extra}"));
    }

    Ok(parsed)
}

fn flag_value(args: &mut impl Iterator<Item = String>, flag: &str) -> Result<String, String> {
    args.next()
        .ok_or_else(|| format!("missing value for {flag}"))
}

fn parse_plan(value: &str) -> Result<Plan, String> {
    Plan::parse(value).ok_or_else(|| format!("invalid plan: {value} (expected free or pro)"))
}

pub fn print_help() {
    println!(
        "CodePruner usage analytics server\n\n\
Usage:\n  codepruner [serve] [--port <port>] [--host <host>] [--data-dir <dir>] [--no-scheduler]\n  \
codepruner project-add <name> [--plan free|pro]\n  \
codepruner project-plan <project-id> <free|pro>\n  \
codepruner run-maintenance\n\n\
Options:\n  --port <port>      Override the configured port for this run only\n  \
--host <host>      Override the configured bind address\n  \
--data-dir <dir>   Override the data directory\n  \
--no-scheduler     Do not run the daily maintenance cycle\n  \
-h, --help         Show this help message\n"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<CliArgs, String> {
        parse_args_from(args.iter().map(|arg| arg.to_string()))
    }

    #[test]
    fn defaults_to_serve() {
        let args = parse(&["--port", "8080", "--no-scheduler"]).expect("args");
        assert_eq!(args.command, Command::Serve);
        assert_eq!(args.port, Some(8080));
        assert!(args.no_scheduler);
    }

    #[test]
    fn parses_project_commands() {
        let args = parse(&["project-add", "Shop", "--plan", "pro"]).expect("args");
        assert_eq!(
            args.command,
            Command::ProjectAdd {
                name: "Shop".to_string(),
                plan: Plan::Pro
            }
        );
        let args = parse(&["project-plan", "prj_1", "free"]).expect("args");
        assert_eq!(
            args.command,
            Command::ProjectPlan {
                id: "prj_1".to_string(),
                plan: Plan::Free
            }
        );
    }

    #[test]
    fn rejects_bad_input() {
        assert!(parse(&["--port", "http"]).is_err());
        assert!(parse(&["project-add"]).is_err());
        assert!(parse(&["project-plan", "prj_1", "gold"]).is_err());
        assert!(parse(&["--verbose"]).is_err());
        assert!(parse(&["serve", "extra"]).is_err());
    }
}
