use std::fmt;
use std::io::{self, Write};
use std::result;

use slog::{Drain, Key, OwnedKVList, Record, KV};
use slog_term::{Decorator, RecordDecorator, Serializer};

pub const TIMESTAMP_FORMAT: &str = "%Y/%m/%d %H:%M:%S%.3f %:z";

/// AbdFormat writes one line per record:
/// `[timestamp] [LEVEL] [file:line] message key: value, ...`.
/// The timestamp column is written only if `timestamp` is set.
pub struct AbdFormat<D>
where
    D: Decorator,
{
    decorator: D,
    timestamp: bool,
}

impl<D> Drain for AbdFormat<D>
where
    D: Decorator,
{
    type Ok = ();
    type Err = io::Error;

    fn log(&self, record: &Record, values: &OwnedKVList) -> result::Result<Self::Ok, Self::Err> {
        self.format(record, values)
    }
}

impl<D> AbdFormat<D>
where
    D: Decorator,
{
    pub fn new(d: D, timestamp: bool) -> AbdFormat<D> {
        AbdFormat {
            decorator: d,
            timestamp,
        }
    }

    fn format(&self, record: &Record, values: &OwnedKVList) -> io::Result<()> {
        self.decorator.with_record(record, values, |decorator| {
            if self.timestamp {
                write_log_timestamp(decorator)?;
            }
            write_log_header(decorator, record)?;
            write_log_msg(decorator, record)?;
            write_log_fields(decorator, record, values)?;

            decorator.start_whitespace()?;
            writeln!(decorator)?;

            decorator.flush()
        })
    }
}

fn write_log_timestamp(rd: &mut dyn RecordDecorator) -> io::Result<()> {
    rd.start_timestamp()?;
    write!(rd, "[{}]", chrono::Local::now().format(TIMESTAMP_FORMAT))?;

    rd.start_whitespace()?;
    write!(rd, " ")
}

fn write_log_header(rd: &mut dyn RecordDecorator, record: &Record) -> io::Result<()> {
    rd.start_level()?;
    write!(rd, "[{}]", record.level().as_short_str())?;

    rd.start_whitespace()?;
    write!(rd, " ")?;

    // there is no `start_line()` or `start_file()`
    rd.start_msg()?;
    write!(rd, "[{}:{}]", record.file(), record.line())
}

fn write_log_msg(rd: &mut dyn RecordDecorator, record: &Record) -> io::Result<()> {
    rd.start_whitespace()?;
    write!(rd, " ")?;

    rd.start_msg()?;
    write!(rd, "{}", record.msg())
}

/// write log record fields
fn write_log_fields(
    rd: &mut dyn RecordDecorator,
    record: &Record,
    values: &OwnedKVList,
) -> io::Result<()> {
    let mut counter = FieldCounter(0);
    record.kv().serialize(record, &mut counter)?;
    values.serialize(record, &mut counter)?;

    if counter.0 == 0 {
        return Ok(());
    }

    rd.start_whitespace()?;
    write!(rd, " ")?;

    // no leading comma; reversed so that record fields are printed as they are written
    let mut serializer = Serializer::new(rd, false, true);

    record.kv().serialize(record, &mut serializer)?;
    values.serialize(record, &mut serializer)?;

    serializer.finish()
}

/// FieldCounter counts the fields of a record without formatting them.
struct FieldCounter(usize);

impl slog::Serializer for FieldCounter {
    fn emit_arguments(&mut self, _key: Key, _val: &fmt::Arguments) -> slog::Result {
        self.0 += 1;
        Ok(())
    }
}
