use std::io::{self, Stderr, Stdout, Write};

use nu_ansi_term::Color::{Blue, Magenta, Red, Yellow};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::{
    fmt::{
        self,
        format::{FmtSpan, Writer},
        FmtContext, FormatEvent, FormatFields, MakeWriter,
    },
    registry::LookupSpan,
};

use crate::{cli::Args, utils::Colored};

#[derive(Default)]
struct MessageVisitor {
    message: Option<String>,
}

impl tracing::field::Visit for MessageVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.message = Some(format!("{value:?}"));
        }
    }
}

/// Plain output for `INFO`, a coloured level tag for everything else.
pub struct CustomFormatter;

impl<S, N> FormatEvent<S, N> for CustomFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> std::fmt::Result {
        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);

        match *event.metadata().level() {
            Level::TRACE => write!(writer, "{} ", Colored(Magenta, "[TRACE]")),
            Level::DEBUG => write!(writer, "{} ", Colored(Blue, "[DEBUG]")),
            Level::INFO => Ok(()),
            Level::WARN => write!(writer, "{} ", Colored(Yellow, "[WARN]")),
            Level::ERROR => write!(writer, "{} ", Colored(Red, "[ERROR]")),
        }?;

        match visitor.message {
            Some(message) => writeln!(writer, "{message}"),
            None => writeln!(writer),
        }
    }
}

/// Command output goes to stdout, diagnostics to stderr.
enum StdioWriter {
    Out(Stdout),
    Err(Stderr),
}

impl Write for StdioWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            StdioWriter::Out(out) => out.write(buf),
            StdioWriter::Err(err) => err.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            StdioWriter::Out(out) => out.flush(),
            StdioWriter::Err(err) => err.flush(),
        }
    }
}

struct WriterBuilder;

impl<'a> MakeWriter<'a> for WriterBuilder {
    type Writer = StdioWriter;

    fn make_writer(&'a self) -> Self::Writer {
        StdioWriter::Out(io::stdout())
    }

    fn make_writer_for(&'a self, meta: &tracing::Metadata<'_>) -> Self::Writer {
        if meta.level() == &Level::INFO {
            StdioWriter::Out(io::stdout())
        } else {
            StdioWriter::Err(io::stderr())
        }
    }
}

fn filter_level(args: &Args) -> Level {
    if args.quiet {
        Level::ERROR
    } else if args.verbose >= 2 {
        Level::TRACE
    } else if args.verbose == 1 {
        Level::DEBUG
    } else {
        Level::INFO
    }
}

pub fn setup_logging(args: &Args) {
    let builder = fmt::Subscriber::builder()
        .with_env_filter(format!("metainfo={}", filter_level(args)))
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_file(false)
        .with_line_number(false)
        .with_span_events(FmtSpan::NONE)
        .with_writer(WriterBuilder)
        .compact()
        .without_time();

    let subscriber: Box<dyn Subscriber + Send + Sync> = if args.json {
        Box::new(builder.json().flatten_event(true).finish())
    } else {
        Box::new(builder.event_format(CustomFormatter).finish())
    };

    if let Err(err) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {err}");
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    fn level_for(argv: &[&str]) -> Level {
        let args = Args::parse_from(argv);
        filter_level(&args)
    }

    #[test]
    fn test_filter_level_from_flags() {
        assert_eq!(level_for(&["metainfo", "defconfig"]), Level::INFO);
        assert_eq!(level_for(&["metainfo", "-v", "defconfig"]), Level::DEBUG);
        assert_eq!(level_for(&["metainfo", "-vv", "defconfig"]), Level::TRACE);
        assert_eq!(level_for(&["metainfo", "defconfig", "-q"]), Level::ERROR);
    }
}
