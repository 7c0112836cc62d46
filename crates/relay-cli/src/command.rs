//! Translates parsed CLI commands into protocol requests.

use std::io::Write;

use relay_config::Config;
use relay_protocol::{
    Command, Decoded, OutboundRequest, TimeCommand, TimeReport, Timestamp, classify, decode,
    encode_generic, encode_status_request, encode_time_get_request, encode_time_set_request,
};
use relayd::{RelayLink, SendError};
use time::macros::format_description;
use time::{OffsetDateTime, PrimitiveDateTime};

use crate::cli::{Cli, CliCommand, RequestCommand, TimeAction};
use crate::{AppError, LinkFactory};

/// Runs `cli` against the loaded configuration, writing results to `stdout`.
pub(crate) fn execute<F, W>(
    cli: &Cli,
    config: &Config,
    links: &F,
    stdout: &mut W,
) -> Result<(), AppError>
where
    F: LinkFactory,
    W: Write,
{
    let command = match &cli.command {
        CliCommand::Decode { text } => return describe(&decode(text.as_bytes()), stdout),
        CliCommand::Request(command) => command,
    };

    let outbound = Outbound::try_from(command)?;
    if cli.dry_run {
        writeln!(stdout, "{}", outbound.request())?;
        return Ok(());
    }

    outbound.deliver(&links.link(config))?;
    writeln!(
        stdout,
        "sent {} to {}",
        outbound.request(),
        config.controller_endpoint()
    )?;
    Ok(())
}

/// A request ready for the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Outbound {
    TimeGet,
    TimeSet(Timestamp),
    Status,
    Raw(OutboundRequest),
}

impl Outbound {
    /// Wire form of the request.
    pub(crate) fn request(&self) -> OutboundRequest {
        match self {
            Self::TimeGet => encode_time_get_request(),
            Self::TimeSet(timestamp) => encode_time_set_request(timestamp),
            Self::Status => encode_status_request(),
            Self::Raw(request) => request.clone(),
        }
    }

    fn deliver(&self, link: &RelayLink) -> Result<(), SendError> {
        match self {
            Self::TimeGet => link.request_time(),
            Self::TimeSet(timestamp) => link.set_time(timestamp),
            Self::Status => link.request_status(),
            Self::Raw(request) => link.send(request),
        }
    }
}

impl TryFrom<&RequestCommand> for Outbound {
    type Error = AppError;

    fn try_from(command: &RequestCommand) -> Result<Self, Self::Error> {
        match command {
            RequestCommand::Time {
                action: TimeAction::Get,
            } => Ok(Self::TimeGet),
            RequestCommand::Time {
                action: TimeAction::Set { at },
            } => {
                let datetime = match at {
                    Some(input) => parse_local_time(input)?,
                    None => local_now(),
                };
                Ok(Self::TimeSet(Timestamp::from_datetime(datetime)?))
            }
            RequestCommand::Status => Ok(Self::Status),
            RequestCommand::Send { tokens } => {
                let (primary, rest) = tokens
                    .split_first()
                    .map_or(("", &[][..]), |(first, rest)| (first.as_str(), rest));
                Ok(Self::Raw(encode_generic(primary, rest)))
            }
        }
    }
}

pub(crate) fn parse_local_time(input: &str) -> Result<PrimitiveDateTime, AppError> {
    let format = format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");
    PrimitiveDateTime::parse(input.trim(), format).map_err(|source| AppError::InvalidTime {
        input: input.to_owned(),
        source,
    })
}

fn local_now() -> PrimitiveDateTime {
    let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
    PrimitiveDateTime::new(now.date(), now.time())
}

fn describe<W: Write>(command: &Command, stdout: &mut W) -> Result<(), AppError> {
    writeln!(stdout, "kind: {}", command.kind())?;
    writeln!(stdout, "primary: {}", command.primary_token())?;
    writeln!(stdout, "arguments: {}", command.arguments().join(" "))?;
    match classify(command.clone())? {
        Decoded::Generic(generic) => {
            writeln!(stdout, "response: {}", generic.is_response())?;
            writeln!(stdout, "acknowledged: {}", generic.is_acknowledgement())?;
        }
        Decoded::Time(time) => describe_time(&time, stdout)?,
    }
    Ok(())
}

fn describe_time<W: Write>(time: &TimeCommand, stdout: &mut W) -> Result<(), AppError> {
    writeln!(stdout, "operation: {}", time.operation())?;
    match time.report() {
        TimeReport::Absent => writeln!(stdout, "report: absent")?,
        TimeReport::Valid(stamp) => {
            writeln!(stdout, "report: {stamp} (weekday {})", stamp.weekday())?;
        }
        TimeReport::Malformed => writeln!(stdout, "report: malformed")?,
    }
    writeln!(stdout, "acknowledged: {}", time.is_acknowledgement())?;
    Ok(())
}
