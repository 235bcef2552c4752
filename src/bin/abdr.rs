use std::path::PathBuf;
use std::process;

use clap::{value_t_or_exit, App, AppSettings, Arg, ArgMatches, SubCommand};
use slog::{error, info, Logger};

use abd::abdpb::Value;
use abd::conf::{ClusterConf, ConfError};
use abd::Coordinator;

use abdr::harness::{check_server_processes, run_client_scenarios, shutdown_processes};
use abdr::{new_logger, LogConfig, Server};

fn servers_arg<'a, 'b>() -> Arg<'a, 'b> {
    Arg::with_name("servers")
        .required_unless("conf")
        .help("comma separated list of replicas, e.g. 127.0.0.1:5001,127.0.0.1:5002")
}

fn conf_arg<'a, 'b>() -> Arg<'a, 'b> {
    Arg::with_name("conf")
        .long("conf")
        .takes_value(true)
        .help("cluster config in yaml, used instead of <servers>")
}

fn cli<'a, 'b>() -> App<'a, 'b> {
    App::new("abdr")
        .version("0.1.0")
        .author("openacid")
        .about("linearizable register replicated with ABD")
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .arg(
            Arg::with_name("debug")
                .long("debug")
                .global(true)
                .help("log at debug level"),
        )
        .arg(
            Arg::with_name("timestamp")
                .long("timestamp")
                .global(true)
                .help("prefix log lines with a timestamp"),
        )
        .arg(
            Arg::with_name("log-file")
                .long("log-file")
                .takes_value(true)
                .global(true)
                .help("append logs to this file instead of stdout"),
        )
        .subcommand(
            SubCommand::with_name("server")
                .about("start a replica server")
                .arg(
                    Arg::with_name("listen")
                        .required(true)
                        .help("host:port to listen on"),
                )
                .arg(
                    Arg::with_name("name")
                        .long("name")
                        .takes_value(true)
                        .help("name reported to clients, defaults to <listen>"),
                ),
        )
        .subcommand(
            SubCommand::with_name("client")
                .about("read or write the register")
                .setting(AppSettings::SubcommandRequiredElseHelp)
                .arg(servers_arg())
                .arg(conf_arg())
                .subcommand(
                    SubCommand::with_name("read")
                        .about("read an address")
                        .arg(Arg::with_name("addr").required(true)),
                )
                .subcommand(
                    SubCommand::with_name("write")
                        .about("write a value to an address")
                        .arg(Arg::with_name("addr").required(true))
                        .arg(Arg::with_name("value").required(true)),
                ),
        )
        .subcommand(
            SubCommand::with_name("test-server-processes")
                .about("check that every replica honors enable requests")
                .arg(servers_arg())
                .arg(conf_arg()),
        )
        .subcommand(
            SubCommand::with_name("test-client")
                .about("run read and write scenarios with injected failures")
                .arg(servers_arg())
                .arg(conf_arg()),
        )
        .subcommand(
            SubCommand::with_name("shutdown-processes")
                .about("ask every replica to exit")
                .arg(servers_arg())
                .arg(conf_arg()),
        )
}

/// Global flags may be given after a subcommand, where clap stores them in the subcommand
/// matches.
fn flag_present(m: &ArgMatches, name: &str) -> bool {
    m.is_present(name) || m.subcommand().1.map_or(false, |sub| flag_present(sub, name))
}

fn flag_value<'a>(m: &'a ArgMatches, name: &str) -> Option<&'a str> {
    m.value_of(name)
        .or_else(|| m.subcommand().1.and_then(|sub| flag_value(sub, name)))
}

fn log_config(m: &ArgMatches) -> LogConfig {
    LogConfig {
        debug: flag_present(m, "debug"),
        timestamp: flag_present(m, "timestamp"),
        file: flag_value(m, "log-file").map(PathBuf::from),
    }
}

fn cluster_conf(m: &ArgMatches) -> Result<ClusterConf, ConfError> {
    match m.value_of("conf") {
        Some(path) => ClusterConf::from_file(path),
        None => ClusterConf::from_endpoints(m.value_of("servers").unwrap_or_default()),
    }
}

fn coordinator(m: &ArgMatches, logger: &Logger) -> Coordinator {
    let conf = cluster_conf(m).unwrap_or_else(|e| {
        eprintln!("bad cluster config: {}", e);
        process::exit(2);
    });

    Coordinator::from_conf(&conf, logger).unwrap_or_else(|e| {
        eprintln!("failed to create client: {}", e);
        process::exit(2);
    })
}

async fn run_server(m: &ArgMatches<'_>, logger: &Logger) -> i32 {
    let listen = m.value_of("listen").unwrap_or_default();
    let name = m.value_of("name").unwrap_or(listen);

    let mut server = match Server::new(name, listen, logger) {
        Ok(s) => s,
        Err(e) => {
            error!(logger, "failed to create server"; "err" => %e);
            return 2;
        }
    };

    server.start();

    match server.join().await {
        Ok(_) => 0,
        Err(e) => {
            error!(logger, "server failed"; "err" => %e);
            1
        }
    }
}

async fn run_client(m: &ArgMatches<'_>, logger: &Logger) -> i32 {
    let c = coordinator(m, logger);

    match m.subcommand() {
        ("read", Some(sub)) => {
            let addr = value_t_or_exit!(sub, "addr", i64);
            match c.read(addr).await {
                Ok((label, value)) => {
                    println!("{}({})", value, label);
                    0
                }
                Err(e) => {
                    info!(logger, "read failed"; "addr" => addr, "err" => %e);
                    println!("failed");
                    1
                }
            }
        }
        ("write", Some(sub)) => {
            let addr = value_t_or_exit!(sub, "addr", i64);
            let value = Value::parse(sub.value_of("value").unwrap_or_default());
            match c.write(addr, value).await {
                Ok(_) => {
                    println!("success");
                    0
                }
                Err(e) => {
                    info!(logger, "write failed"; "addr" => addr, "err" => %e);
                    println!("failure");
                    1
                }
            }
        }
        _ => 2,
    }
}

#[tokio::main]
async fn main() {
    let matches = cli().get_matches();

    let logger = new_logger(&log_config(&matches)).unwrap_or_else(|e| {
        eprintln!("failed to set up logging: {}", e);
        process::exit(2);
    });

    let code = match matches.subcommand() {
        ("server", Some(m)) => run_server(m, &logger).await,
        ("client", Some(m)) => run_client(m, &logger).await,
        (cmd, Some(m)) => {
            let c = coordinator(m, &logger);
            let rst = match cmd {
                "test-server-processes" => check_server_processes(&c, &logger).await,
                "test-client" => run_client_scenarios(&c, &logger).await,
                _ => shutdown_processes(&c, &logger).await,
            };

            match rst {
                Ok(_) => {
                    println!("PASSED");
                    0
                }
                Err(e) => {
                    error!(logger, "check failed"; "cmd" => cmd, "err" => %e);
                    println!("FAILED: {}", e);
                    1
                }
            }
        }
        _ => 2,
    };

    // dropping the logger flushes the async drain
    drop(logger);
    process::exit(code);
}
