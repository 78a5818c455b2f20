//! authd CLI 分发：`run`、`doctor`、`version`、`help`。

use anyhow::anyhow;
use serde_json::{Value, json};

use crate::config::{Config, StoreConfig};

/// CLI 分发结果。
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum CliDispatch {
    /// 继续进入服务主循环。
    Run,
    /// 命令已处理完成，主程序应退出。
    Exit,
}

/// 解析并执行 authd CLI。
pub(crate) fn dispatch(args: &[String]) -> anyhow::Result<CliDispatch> {
    let Some(first) = args.first() else {
        return Ok(CliDispatch::Run);
    };

    let cmd = first.trim();
    if cmd.is_empty() || cmd == "run" {
        return Ok(CliDispatch::Run);
    }

    if matches!(cmd, "-h" | "--help" | "help") {
        print_root_help();
        return Ok(CliDispatch::Exit);
    }

    match cmd {
        "doctor" => {
            let format = parse_doctor_format(&args[1..])?;
            run_doctor(format);
            Ok(CliDispatch::Exit)
        }
        "version" => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            Ok(CliDispatch::Exit)
        }
        other => Err(anyhow!(
            "unknown command: {other}; run `yc-authd --help` for usage"
        )),
    }
}

/// `doctor` 输出格式。
#[derive(Debug, PartialEq, Eq)]
enum DoctorFormat {
    Text,
    Json,
}

/// 解析 doctor 的 `--format` 参数。
fn parse_doctor_format(args: &[String]) -> anyhow::Result<DoctorFormat> {
    if args.is_empty() {
        return Ok(DoctorFormat::Text);
    }
    if args.len() == 2 && args[0] == "--format" {
        return match args[1].as_str() {
            "text" => Ok(DoctorFormat::Text),
            "json" => Ok(DoctorFormat::Json),
            other => Err(anyhow!("unsupported doctor format: {other}")),
        };
    }
    Err(anyhow!("usage: yc-authd doctor [--format text|json]"))
}

/// 打印解析后的配置（密钥脱敏）；配置无效时以非零码退出。
fn run_doctor(format: DoctorFormat) {
    let report = match Config::from_env() {
        Ok(config) => doctor_report(&config),
        Err(err) => {
            match format {
                DoctorFormat::Text => println!("config-error: {err:#}"),
                DoctorFormat::Json => println!("{}", json!({ "configError": format!("{err:#}") })),
            }
            std::process::exit(1);
        }
    };

    match format {
        DoctorFormat::Text => {
            if let Value::Object(fields) = &report {
                for (key, value) in fields {
                    match value {
                        Value::String(text) => println!("{key}: {text}"),
                        other => println!("{key}: {other}"),
                    }
                }
            }
        }
        DoctorFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&report).unwrap_or_else(|_| "{}".to_string())
            );
        }
    }
}

/// 生成 doctor 报告。
fn doctor_report(config: &Config) -> Value {
    let store_target = match &config.store {
        StoreConfig::Memory => String::new(),
        StoreConfig::File { path } => path.display().to_string(),
        StoreConfig::Sqlite { url } => url.clone(),
        StoreConfig::Mongo { database, .. } => format!("mongodb database {database}"),
    };
    let token_secret = if config.token_secret_generated {
        "generated"
    } else {
        "configured"
    };
    let admin_key = if config.admin_key.is_some() {
        "configured"
    } else {
        "unset"
    };
    json!({
        "addr": config.addr,
        "routePrefix": config.route_prefix,
        "store": config.store.kind(),
        "storeTarget": store_target,
        "tokenSecret": token_secret,
        "adminKey": admin_key,
        "testingMode": config.testing_mode,
    })
}

/// 打印 root help。
fn print_root_help() {
    println!("yc-authd usage:");
    println!("  yc-authd run");
    println!("  yc-authd doctor [--format text|json]");
    println!("  yc-authd version");
}

#[cfg(test)]
mod tests {
    use super::{CliDispatch, DoctorFormat, dispatch, doctor_report, parse_doctor_format};
    use crate::config::Config;

    fn args(items: &[&str]) -> Vec<String> {
        items.iter().map(|item| item.to_string()).collect()
    }

    #[test]
    fn empty_and_run_start_the_service() {
        assert_eq!(dispatch(&[]).unwrap(), CliDispatch::Run);
        assert_eq!(dispatch(&args(&["run"])).unwrap(), CliDispatch::Run);
        assert_eq!(dispatch(&args(&["version"])).unwrap(), CliDispatch::Exit);
        assert!(dispatch(&args(&["frobnicate"])).is_err());
    }

    #[test]
    fn doctor_format_parsing() {
        assert_eq!(parse_doctor_format(&[]).unwrap(), DoctorFormat::Text);
        assert_eq!(
            parse_doctor_format(&args(&["--format", "json"])).unwrap(),
            DoctorFormat::Json
        );
        assert!(parse_doctor_format(&args(&["--format", "yaml"])).is_err());
        assert!(parse_doctor_format(&args(&["json"])).is_err());
    }

    #[test]
    fn doctor_report_never_leaks_secrets() {
        let config = Config::from_lookup(|key| match key {
            "AUTH_TOKEN_SECRET" => Some("super-secret".to_string()),
            "AUTH_ADMIN_KEY" => Some("admin-secret".to_string()),
            _ => None,
        })
        .unwrap();
        let rendered = doctor_report(&config).to_string();
        assert!(!rendered.contains("super-secret"));
        assert!(!rendered.contains("admin-secret"));
        assert!(rendered.contains("\"tokenSecret\":\"configured\""));
    }
}
