// Copyright 2017-2020 Peter Williams and collaborators
// Licensed under the MIT License.

/*!
A notification backend that sends colorized output to the terminal.
*/

use anyhow::Error;
use std::fmt::Arguments;
use std::io::Write;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use super::{ChatterLevel, NotificationBackend, NotificationKind};

/// A notification backend that writes colorized output to the terminal.
///
/// Notes go to standard output; everything else goes to standard error.
/// At `ChatterLevel::Minimal`, notes are suppressed entirely.
pub struct TermcolorNotificationBackend {
    chatter: ChatterLevel,
    stdout: StandardStream,
    stderr: StandardStream,
    note_spec: ColorSpec,
    warning_spec: ColorSpec,
    error_spec: ColorSpec,
}

impl TermcolorNotificationBackend {
    /// Create a new TermcolorNotificationBackend.
    pub fn new(chatter: ChatterLevel) -> TermcolorNotificationBackend {
        let mut note_spec = ColorSpec::new();
        note_spec.set_fg(Some(Color::Green)).set_bold(true);

        let mut warning_spec = ColorSpec::new();
        warning_spec.set_fg(Some(Color::Yellow)).set_bold(true);

        let mut error_spec = ColorSpec::new();
        error_spec.set_fg(Some(Color::Red)).set_bold(true);

        TermcolorNotificationBackend {
            chatter,
            stdout: StandardStream::stdout(ColorChoice::Auto),
            stderr: StandardStream::stderr(ColorChoice::Auto),
            note_spec,
            warning_spec,
            error_spec,
        }
    }

    fn generic_message(&mut self, kind: NotificationKind, prefix: Option<&str>, args: Arguments) {
        if kind == NotificationKind::Note && self.chatter <= ChatterLevel::Minimal {
            return;
        }

        let text = match prefix {
            Some(s) => s,
            None => match kind {
                NotificationKind::Note => "note:",
                NotificationKind::Warning => "warning:",
                NotificationKind::Severe => "severe:",
                NotificationKind::Fatal => "fatal:",
            },
        };

        let (spec, stream) = match kind {
            NotificationKind::Note => (&self.note_spec, &mut self.stdout),
            NotificationKind::Warning => (&self.warning_spec, &mut self.stderr),
            NotificationKind::Severe | NotificationKind::Fatal => {
                (&self.error_spec, &mut self.stderr)
            }
        };

        // If the terminal is gone there is nowhere left to complain to.
        let _ = stream.set_color(spec);
        let _ = write!(stream, "{text}");
        let _ = stream.reset();
        let _ = writeln!(stream, " {args}");
    }

    /// Print the information contained in an Error object, including the
    /// chain of errors that caused it.
    pub fn bare_error<E: Into<Error>>(&mut self, err: E) {
        let mut prefix = "error:";

        for cause in err.into().chain() {
            self.generic_message(
                NotificationKind::Severe,
                Some(prefix),
                format_args!("{cause}"),
            );
            prefix = "caused by:";
        }
    }
}

impl NotificationBackend for TermcolorNotificationBackend {
    fn notify(&mut self, kind: NotificationKind, args: Arguments, err: Option<Error>) {
        self.generic_message(kind, None, args);

        if let Some(e) = err {
            for cause in e.chain() {
                self.generic_message(kind, Some("caused by:"), format_args!("{cause}"));
            }
        }
    }
}
