use std::{
    net::{Ipv4Addr, SocketAddrV4},
    path::PathBuf,
    time::Duration,
};

use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;
use tsdecrypt::{
    constants::{DEFAULT_PASS, DEFAULT_PORT, DEFAULT_SERVER, DEFAULT_USER},
    tsdecrypt::{run, NotifyConfig, Options, ServerConfig, TransportMode},
    CaSystem,
};

#[derive(Clone, Copy, ValueEnum)]
enum Sink {
    /// Write each camd35 frame to NNN-emm.dump / NNN-ecm.dump
    Capture,
    /// Exchange frames with the server over UDP
    Udp,
}

/// Relays EMM/ECM from an MPEG-TS on stdin to a camd35 server.
///
///     tsdecrypt [opts] < mpeg_ts
#[derive(Parser)]
#[command(name = "tsdecrypt", version)]
struct Opt {
    /// CA system: IRDETO, CONNAX or CRYPTOWORKS (also SECA, VIACCESS, VIDEOGUARD, NAGRA)
    #[arg(short = 'C', long, default_value = "CONNAX")]
    ca_system: CaSystem,

    /// camd35 server IPv4 address
    #[arg(short = 'S', long, default_value = DEFAULT_SERVER)]
    server: Ipv4Addr,

    /// camd35 server port
    #[arg(short = 'P', long, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// camd35 user
    #[arg(short = 'u', long, default_value = DEFAULT_USER)]
    user: String,

    /// camd35 password
    #[arg(short = 'p', long, default_value = DEFAULT_PASS)]
    password: String,

    /// Where frames go
    #[arg(long, value_enum, default_value_t = Sink::Capture)]
    transport: Sink,

    /// Directory for capture files
    #[arg(long, default_value = ".")]
    capture_dir: PathBuf,

    /// How long to wait for a CW answer (udp transport)
    #[arg(long, default_value_t = 2000)]
    timeout_ms: u64,

    /// Identity passed to the notify program
    #[arg(long, requires = "notify_program")]
    ident: Option<String>,

    /// Program run for every operational event
    #[arg(long, requires = "ident")]
    notify_program: Option<PathBuf>,

    /// Print a JSON session report on stdout at end of input
    #[arg(long, default_value_t = false)]
    report: bool,

    /// More logging (-v debug, -vv trace); RUST_LOG wins when set
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let opt = Opt::parse();

    let level = match opt.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_writer(std::io::stderr)
        .init();

    let transport = match opt.transport {
        Sink::Capture => TransportMode::Capture(opt.capture_dir),
        Sink::Udp => TransportMode::Udp(Duration::from_millis(opt.timeout_ms)),
    };
    let notify = opt
        .ident
        .zip(opt.notify_program)
        .map(|(ident, program)| NotifyConfig { ident, program });

    run(Options {
        ca_system: opt.ca_system,
        server: ServerConfig {
            addr: SocketAddrV4::new(opt.server, opt.port),
            user: opt.user,
            pass: opt.password,
        },
        transport,
        notify,
        report: opt.report,
    })
    .await
}
