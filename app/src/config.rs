use std::ffi::OsString;
use std::path::PathBuf;
use std::time::Duration;

use pico_args::Arguments;

pub const USAGE: &str = "\
usage:
  app run <IMAGE> [--memory <FILE>] [--clock <HZ>] [--seed <N>] [--zeroed]
                  [--continuous] [--max-cycles <N>] [-v|--verbose]... [--log-file <PATH>]
  app demo-image <OUT>
  app dump <IMAGE> [--from <ADDR>] [--count <N>]

interactive commands: run|r pause|p step|s exit|quit clear|clr, empty line repeats";

#[derive(Clone, Debug, PartialEq)]
pub struct RunConfig {
    pub image: PathBuf,
    pub memory: Option<PathBuf>,
    pub clock: f64,
    /// Wall-clock time per tick, `1 / clock`.
    pub period: Duration,
    pub seed: Option<u64>,
    pub zeroed: bool,
    pub continuous: bool,
    pub max_cycles: Option<u64>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct DumpConfig {
    pub image: PathBuf,
    pub from: u16,
    pub count: u16,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Invocation {
    Run(RunConfig),
    DemoImage { out: PathBuf },
    Dump(DumpConfig),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub verbosity: u8,
    pub log_file: Option<PathBuf>,
    pub invocation: Invocation,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error(transparent)]
    Args(#[from] pico_args::Error),
    #[error("missing subcommand")]
    MissingSubcommand,
    #[error("unknown subcommand '{0}'")]
    UnknownSubcommand(String),
    #[error("clock must be a positive number of hertz, got {0}")]
    BadClock(f64),
    #[error("unexpected arguments {0:?}")]
    Unexpected(Vec<OsString>),
}

/// Accepts `0x`-prefixed hex or decimal.
fn parse_address(s: &str) -> Result<u16, std::num::ParseIntError> {
    match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u16::from_str_radix(hex, 16),
        None => s.parse(),
    }
}

pub fn parse(mut args: Arguments) -> Result<Config, ConfigError> {
    let mut verbosity = 0u8;
    while args.contains(["-v", "--verbose"]) {
        verbosity = verbosity.saturating_add(1);
    }
    let log_file = args.opt_value_from_str("--log-file")?;

    let invocation = match args.subcommand()?.as_deref() {
        Some("run") => {
            let memory = args.opt_value_from_str("--memory")?;
            let clock: f64 = args.opt_value_from_str("--clock")?.unwrap_or(1.0);
            if !(clock > 0.0 && clock.is_finite()) {
                return Err(ConfigError::BadClock(clock));
            }
            let period = Duration::try_from_secs_f64(1.0 / clock).map_err(|_| ConfigError::BadClock(clock))?;
            let seed = args.opt_value_from_str("--seed")?;
            let zeroed = args.contains("--zeroed");
            let continuous = args.contains("--continuous");
            let max_cycles = args.opt_value_from_str("--max-cycles")?;
            let image = args.free_from_str()?;
            Invocation::Run(RunConfig {
                image,
                memory,
                clock,
                period,
                seed,
                zeroed,
                continuous,
                max_cycles,
            })
        }
        Some("demo-image") => Invocation::DemoImage {
            out: args.free_from_str()?,
        },
        Some("dump") => {
            let from = args.opt_value_from_fn("--from", parse_address)?.unwrap_or(0);
            let count = args.opt_value_from_str("--count")?.unwrap_or(128);
            let image = args.free_from_str()?;
            Invocation::Dump(DumpConfig { image, from, count })
        }
        Some(other) => return Err(ConfigError::UnknownSubcommand(other.to_string())),
        None => return Err(ConfigError::MissingSubcommand),
    };

    let rest = args.finish();
    if !rest.is_empty() {
        return Err(ConfigError::Unexpected(rest));
    }

    Ok(Config {
        verbosity,
        log_file,
        invocation,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_strs(args: &[&str]) -> Result<Config, ConfigError> {
        parse(Arguments::from_vec(args.iter().map(OsString::from).collect()))
    }

    #[test]
    fn run_defaults() {
        let config = parse_strs(&["run", "micro.bin"]).unwrap();
        assert_eq!(0, config.verbosity);
        assert_eq!(None, config.log_file);
        assert_eq!(
            Invocation::Run(RunConfig {
                image: PathBuf::from("micro.bin"),
                memory: None,
                clock: 1.0,
                period: Duration::from_secs(1),
                seed: None,
                zeroed: false,
                continuous: false,
                max_cycles: None,
            }),
            config.invocation);
    }

    #[test]
    fn run_everything() {
        let config = parse_strs(&[
            "-v", "run", "--memory", "prog.bin", "--clock", "50", "--seed", "7",
            "--continuous", "--max-cycles", "100", "micro.bin", "--verbose", "--log-file", "sim.log",
        ])
        .unwrap();
        assert_eq!(2, config.verbosity);
        assert_eq!(Some(PathBuf::from("sim.log")), config.log_file);
        match config.invocation {
            Invocation::Run(run) => {
                assert_eq!(Some(PathBuf::from("prog.bin")), run.memory);
                assert_eq!(50.0, run.clock);
                assert_eq!(Duration::from_millis(20), run.period);
                assert_eq!(Some(7), run.seed);
                assert!(run.continuous);
                assert!(!run.zeroed);
                assert_eq!(Some(100), run.max_cycles);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn dump_addresses() {
        let config = parse_strs(&["dump", "micro.bin", "--from", "0x80", "--count", "4"]).unwrap();
        assert_eq!(
            Invocation::Dump(DumpConfig { image: PathBuf::from("micro.bin"), from: 0x80, count: 4 }),
            config.invocation);
        assert_eq!(Ok(200), parse_address("200"));
        assert!(parse_address("0xZZ").is_err());
    }

    #[test]
    fn demo_image() {
        let config = parse_strs(&["demo-image", "out.bin"]).unwrap();
        assert_eq!(Invocation::DemoImage { out: PathBuf::from("out.bin") }, config.invocation);
    }

    #[test]
    fn usage_errors() {
        assert!(matches!(parse_strs(&[]), Err(ConfigError::MissingSubcommand)));
        assert!(matches!(parse_strs(&["fly"]), Err(ConfigError::UnknownSubcommand(_))));
        assert!(matches!(parse_strs(&["run"]), Err(ConfigError::Args(_))));
        assert!(matches!(parse_strs(&["run", "a", "b"]), Err(ConfigError::Unexpected(_))));
        assert!(matches!(parse_strs(&["run", "a", "--clock", "0"]), Err(ConfigError::BadClock(_))));
        assert!(matches!(parse_strs(&["run", "a", "--clock", "inf"]), Err(ConfigError::BadClock(_))));
    }

    #[test]
    fn clock_too_slow_for_a_period() {
        match parse_strs(&["run", "a", "--clock", "1e-30"]) {
            Err(ConfigError::BadClock(clock)) => assert_eq!(1e-30, clock),
            other => panic!("unexpected {:?}", other),
        }
    }
}
