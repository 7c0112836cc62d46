//! Time-sync commands (`CR`).
//!
//! The controller reports and accepts its clock as a fixed positional layout:
//!
//! ```text
//! CR:<op>:<sec>:<min>:<hour>:<weekday>:<day>:<month>:<yearOffset>
//! ```
//!
//! where the weekday counts from Sunday = 0 and the year is two digits past
//! 2000. Reports leave the weekday position unread; the weekday of a decoded
//! report is taken from its date.

use std::fmt;
use std::str::FromStr;

use time::{Date, Month, PrimitiveDateTime, Time};

use crate::command::Command;
use crate::error::CodecError;
use crate::registry::{CommandKind, Operation};

/// Token count of a complete time report.
pub const TIME_REPORT_TOKENS: usize = 9;

const CONTROLLER_EPOCH: i32 = 2000;
const MAX_YEAR_OFFSET: u8 = 99;

/// Operation carried by a time-sync command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeOperation {
    /// The controller reports its clock, or a request for it.
    Get,
    /// The controller clock was, or should be, set.
    Set,
    /// The controller rejected the previous command.
    Nack,
}

impl TimeOperation {
    fn from_operation(operation: Operation) -> Option<Self> {
        match operation {
            Operation::Get => Some(Self::Get),
            Operation::Set => Some(Self::Set),
            Operation::Nack => Some(Self::Nack),
            _ => None,
        }
    }

    /// Wire token for the operation.
    #[must_use]
    pub const fn token(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Set => "SET",
            Self::Nack => "NACK",
        }
    }
}

impl fmt::Display for TimeOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// Calendar instant as exchanged with the controller.
///
/// Construction validates every component, so a `Timestamp` always names a
/// real date in the years 2000 to 2099.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Timestamp {
    year: u16,
    month: u8,
    day: u8,
    weekday: u8,
    hour: u8,
    minute: u8,
    second: u8,
}

impl Timestamp {
    /// Builds a timestamp from its components.
    ///
    /// `weekday` counts from Sunday = 0. It is validated for range but not
    /// cross-checked against the date, because the controller keeps its own
    /// weekday counter.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::YearOutOfRange`] for years outside 2000-2099 and
    /// [`CodecError::InvalidTimestamp`] for impossible dates or times.
    pub fn new(
        year: u16,
        month: u8,
        day: u8,
        weekday: u8,
        hour: u8,
        minute: u8,
        second: u8,
    ) -> Result<Self, CodecError> {
        let stamp = Self {
            year,
            month,
            day,
            weekday,
            hour,
            minute,
            second,
        };
        stamp.validate()?;
        Ok(stamp)
    }

    /// Builds a timestamp from a date-time, deriving the weekday.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::YearOutOfRange`] when the year cannot be
    /// represented as a two-digit offset from 2000.
    pub fn from_datetime(datetime: PrimitiveDateTime) -> Result<Self, CodecError> {
        let full_year = datetime.year();
        let in_range = (CONTROLLER_EPOCH..=CONTROLLER_EPOCH + i32::from(MAX_YEAR_OFFSET))
            .contains(&full_year);
        let Some(year) = u16::try_from(full_year).ok().filter(|_| in_range) else {
            return Err(CodecError::YearOutOfRange { year: full_year });
        };
        Ok(Self {
            year,
            month: u8::from(datetime.month()),
            day: datetime.day(),
            weekday: datetime.weekday().number_days_from_sunday(),
            hour: datetime.hour(),
            minute: datetime.minute(),
            second: datetime.second(),
        })
    }

    /// Converts the timestamp to a date-time.
    ///
    /// # Errors
    ///
    /// Never fails for a timestamp built through [`Timestamp::new`] or
    /// [`Timestamp::from_datetime`]; the error path exists for the shared
    /// validation routine.
    pub fn to_datetime(&self) -> Result<PrimitiveDateTime, CodecError> {
        let month = Month::try_from(self.month).map_err(|error| invalid(&error))?;
        let date = Date::from_calendar_date(i32::from(self.year), month, self.day)
            .map_err(|error| invalid(&error))?;
        let time =
            Time::from_hms(self.hour, self.minute, self.second).map_err(|error| invalid(&error))?;
        Ok(PrimitiveDateTime::new(date, time))
    }

    fn validate(&self) -> Result<(), CodecError> {
        let year = i32::from(self.year);
        if !(CONTROLLER_EPOCH..=CONTROLLER_EPOCH + i32::from(MAX_YEAR_OFFSET)).contains(&year) {
            return Err(CodecError::YearOutOfRange { year });
        }
        if self.weekday > 6 {
            return Err(CodecError::InvalidTimestamp {
                reason: format!("weekday {} is not in 0-6", self.weekday),
            });
        }
        self.to_datetime().map(|_| ())
    }

    /// Full year, 2000 or later.
    #[must_use]
    pub const fn year(&self) -> u16 {
        self.year
    }

    /// Two-digit offset of the year from 2000, as sent on the wire.
    #[must_use]
    pub const fn year_offset(&self) -> u16 {
        self.year.saturating_sub(2000)
    }

    /// Month of the year, 1-12.
    #[must_use]
    pub const fn month(&self) -> u8 {
        self.month
    }

    /// Day of the month.
    #[must_use]
    pub const fn day(&self) -> u8 {
        self.day
    }

    /// Day of the week, Sunday = 0.
    #[must_use]
    pub const fn weekday(&self) -> u8 {
        self.weekday
    }

    /// Hour of the day, 0-23.
    #[must_use]
    pub const fn hour(&self) -> u8 {
        self.hour
    }

    /// Minute of the hour.
    #[must_use]
    pub const fn minute(&self) -> u8 {
        self.minute
    }

    /// Second of the minute.
    #[must_use]
    pub const fn second(&self) -> u8 {
        self.second
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
            self.year, self.month, self.day, self.hour, self.minute, self.second
        )
    }
}

fn invalid(error: &time::error::ComponentRange) -> CodecError {
    CodecError::InvalidTimestamp {
        reason: error.to_string(),
    }
}

/// Clock payload of a time command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeReport {
    /// No clock was carried, as in `CR:GET` or `CR:SET:ACK`.
    Absent,
    /// A complete, well-formed clock report.
    Valid(Timestamp),
    /// A `GET` report arrived but its fields could not be read.
    Malformed,
}

/// A decoded time-sync command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeCommand {
    command: Command,
    operation: TimeOperation,
    report: TimeReport,
}

impl TimeCommand {
    /// Underlying generic command.
    #[must_use]
    pub const fn command(&self) -> &Command {
        &self.command
    }

    /// Operation carried in the second token.
    #[must_use]
    pub const fn operation(&self) -> TimeOperation {
        self.operation
    }

    /// Clock payload.
    #[must_use]
    pub const fn report(&self) -> TimeReport {
        self.report
    }

    /// The reported clock, present only for a well-formed `GET` report.
    #[must_use]
    pub const fn timestamp(&self) -> Option<Timestamp> {
        match self.report {
            TimeReport::Valid(stamp) => Some(stamp),
            TimeReport::Absent | TimeReport::Malformed => None,
        }
    }

    /// True when the command answers an earlier request.
    #[must_use]
    pub const fn is_response(&self) -> bool {
        matches!(
            self.operation,
            TimeOperation::Get | TimeOperation::Set | TimeOperation::Nack
        )
    }

    /// True exactly when the third token is `ACK`.
    #[must_use]
    pub fn is_acknowledgement(&self) -> bool {
        self.command.operation_at(2) == Operation::Ack
    }

    /// True when the controller signalled an error rather than a result.
    #[must_use]
    pub const fn is_error(&self) -> bool {
        !matches!(self.operation, TimeOperation::Get | TimeOperation::Set)
    }
}

/// Interprets a time-sync command.
///
/// # Errors
///
/// Returns [`CodecError::NotTimeCommand`] when `command` is not of kind
/// [`CommandKind::TimeRequest`], and
/// [`CodecError::UnrecognizedTimeOperation`] when the second token is not
/// `GET`, `SET`, or `NACK`. A malformed clock report is not an error: it
/// yields [`TimeReport::Malformed`].
pub fn decode_time(command: &Command) -> Result<TimeCommand, CodecError> {
    if command.kind() != CommandKind::TimeRequest {
        return Err(CodecError::NotTimeCommand {
            kind: command.kind(),
        });
    }

    let operation = TimeOperation::from_operation(command.operation_at(1)).ok_or_else(|| {
        CodecError::UnrecognizedTimeOperation {
            token: command.token(1).unwrap_or_default().to_owned(),
        }
    })?;

    let report = match (operation, command.tokens().len()) {
        (TimeOperation::Get, TIME_REPORT_TOKENS) => {
            parse_report(command).map_or(TimeReport::Malformed, TimeReport::Valid)
        }
        (TimeOperation::Get, 2) | (TimeOperation::Set | TimeOperation::Nack, _) => {
            TimeReport::Absent
        }
        (TimeOperation::Get, _) => TimeReport::Malformed,
    };

    Ok(TimeCommand {
        command: command.clone(),
        operation,
        report,
    })
}

fn parse_report(command: &Command) -> Option<Timestamp> {
    let field = |index: usize| command.token(index).and_then(parse_u8);
    let second = field(2)?;
    let minute = field(3)?;
    let hour = field(4)?;
    // Token 5 is unused; the weekday follows the date.
    let day = field(6)?;
    let month = Month::try_from(field(7)?).ok()?;
    let offset = field(8).filter(|offset| *offset <= MAX_YEAR_OFFSET)?;
    let date = Date::from_calendar_date(CONTROLLER_EPOCH + i32::from(offset), month, day).ok()?;
    let time = Time::from_hms(hour, minute, second).ok()?;
    Timestamp::from_datetime(PrimitiveDateTime::new(date, time)).ok()
}

fn parse_u8(token: &str) -> Option<u8> {
    u8::from_str(token.trim()).ok()
}
