// Copyright 2017-2020 Peter Williams and collaborators
// Licensed under the MIT License.

/*!
A framework for notifying users about what the OIFITS machinery is doing.

Library operations that can emit diagnostics (loading a file, writing one,
resolving cross-references between tables) take a `&mut dyn
NotificationBackend` argument rather than consulting any process-wide
state. To run quietly, pass a `NoopNotificationBackend`. To inspect what
was said, pass a `BufferingNotificationBackend`.

With the `notifications` feature, this module also provides a colorized
terminal backend and helpers for command-line programs.

*/

#[cfg(feature = "notifications")]
pub mod termcolor;

use anyhow::Error;
use std::cmp;
use std::fmt::Arguments;

/// How chatty the notification system should be.
#[repr(usize)]
#[derive(Clone, Copy, Eq, Debug)]
pub enum ChatterLevel {
    /// A minimal level of output: only warnings and errors will be reported.
    Minimal = 0,

    /// The normal level of output, including informational messages.
    Normal,
}

impl PartialEq for ChatterLevel {
    #[inline]
    fn eq(&self, other: &ChatterLevel) -> bool {
        *self as usize == *other as usize
    }
}

impl PartialOrd for ChatterLevel {
    #[inline]
    fn partial_cmp(&self, other: &ChatterLevel) -> Option<cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ChatterLevel {
    #[inline]
    fn cmp(&self, other: &ChatterLevel) -> cmp::Ordering {
        (*self as usize).cmp(&(*other as usize))
    }
}

/// The kind of notification that is being produced.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum NotificationKind {
    /// An informational notice.
    Note,

    /// Warning of an unusual condition; the program will likely perform as intended.
    Warning,

    /// Notification of a severe problem; the program will likely fail but will attempt to contine.
    Severe,

    /// Notification of a fatal error; the program must give up.
    Fatal,
}

/// Trait for type that handle notifications to the user.
pub trait NotificationBackend {
    /// Notify the user about an event.
    ///
    /// If `err` is not `None`, the information contained in the object should
    /// be reported after the main message.
    fn notify(&mut self, kind: NotificationKind, args: Arguments, err: Option<Error>);
}

/// Send an informational notification to the user.
///
/// Standard usage looks like this:
///
/// ```rust,ignore
/// on_note!(nb, "read {} tables", n_tables);
/// ```
///
/// where `nb` is a type implementing the NotificationBackend trait. You may
/// also provide an Error value after a semicolon; the information it contains
/// will be printed after the informational message. This is not expected to
/// be common usage for this particular macro, but makes more sense for the
/// `on_warning!`, `on_severe!`, and `on_fatal!` macros.
#[macro_export]
macro_rules! on_note {
    ($dest:expr, $( $fmt_args:expr ),*) => {
        $dest.notify($crate::notify::NotificationKind::Note, format_args!($( $fmt_args ),*), None)
    };
    ($dest:expr, $( $fmt_args:expr ),* ; $err:expr) => {
        $dest.notify($crate::notify::NotificationKind::Note, format_args!($( $fmt_args ),*), Some($err))
    };
}

/// Warn the user of a problematic condition.
///
/// See the documentation of `on_note!` for usage information. This macro
/// should be used when an unusual condition has been detected, but the task
/// at hand will likely succeed.
#[macro_export]
macro_rules! on_warning {
    ($dest:expr, $( $fmt_args:expr ),*) => {
        $dest.notify($crate::notify::NotificationKind::Warning, format_args!($( $fmt_args ),*), None)
    };
    ($dest:expr, $( $fmt_args:expr ),* ; $err:expr) => {
        $dest.notify($crate::notify::NotificationKind::Warning, format_args!($( $fmt_args ),*), Some($err))
    };
}

/// Notify the user of a severe problem.
///
/// See the documentation of `on_note!` for usage information. This macro
/// should be used when an issue has been detected that makes it likely that
/// the task at hand cannot be completed successfully.
#[macro_export]
macro_rules! on_severe {
    ($dest:expr, $( $fmt_args:expr ),*) => {
        $dest.notify($crate::notify::NotificationKind::Severe, format_args!($( $fmt_args ),*), None)
    };
    ($dest:expr, $( $fmt_args:expr ),* ; $err:expr) => {
        $dest.notify($crate::notify::NotificationKind::Severe, format_args!($( $fmt_args ),*), Some($err))
    };
}

/// Notify the user of a fatal problem.
///
/// See the documentation of `on_note!` for usage information. This macro
/// should be used when an issue has been detected that forces the program to
/// give up on the task at hand.
#[macro_export]
macro_rules! on_fatal {
    ($dest:expr, $( $fmt_args:expr ),*) => {
        $dest.notify($crate::notify::NotificationKind::Fatal, format_args!($( $fmt_args ),*), None)
    };
    ($dest:expr, $( $fmt_args:expr ),* ; $err:expr) => {
        $dest.notify($crate::notify::NotificationKind::Fatal, format_args!($( $fmt_args ),*), Some($err))
    };
}

/// A no-op notification backend.
///
/// This empty structure implements the NotificationBackend trait. Its
/// `notify()` function does nothing. Use it to silence diagnostics.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopNotificationBackend {}

impl NoopNotificationBackend {
    /// Create a new NoopNotificationBackend object.
    pub fn new() -> NoopNotificationBackend {
        NoopNotificationBackend {}
    }
}

impl NotificationBackend for NoopNotificationBackend {
    fn notify(&mut self, _kind: NotificationKind, _args: Arguments, _err: Option<Error>) {}
}

#[derive(Debug)]
struct NotificationData {
    kind: NotificationKind,
    text: String,
    err: Option<Error>,
}

/// A notification backend that buffers notifications and emits them later.
#[derive(Debug, Default)]
pub struct BufferingNotificationBackend {
    buf: Vec<NotificationData>,
}

impl BufferingNotificationBackend {
    /// Create and return a new BufferingNotificationBackend.
    pub fn new() -> Self {
        Self { buf: Vec::new() }
    }

    /// Get the number of buffered notifications.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Returns true if nothing has been buffered.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Iterate over the buffered notifications as `(kind, text)` pairs.
    pub fn messages(&self) -> impl Iterator<Item = (NotificationKind, &str)> {
        self.buf.iter().map(|info| (info.kind, info.text.as_ref()))
    }

    /// Empty the buffered notifications into a different notification backend.
    ///
    /// This function consumes the object.
    pub fn drain<B: NotificationBackend + ?Sized>(mut self, other: &mut B) {
        for info in self.buf.drain(..) {
            other.notify(info.kind, format_args!("{}", info.text), info.err);
        }
    }
}

impl NotificationBackend for BufferingNotificationBackend {
    fn notify(&mut self, kind: NotificationKind, args: Arguments, err: Option<Error>) {
        self.buf.push(NotificationData {
            kind,
            text: format!("{args}"),
            err,
        });
    }
}

/// An extension trait for adding standard notification arguments to a clap
/// Command object.
#[cfg(feature = "notifications")]
pub trait ClapNotificationArgsExt {
    /// Add standard notification-related arguments to this Command.
    fn oifits_notify_args(self) -> Self;
}

#[cfg(feature = "notifications")]
impl ClapNotificationArgsExt for clap::Command {
    fn oifits_notify_args(self) -> Self {
        self.arg(
            clap::Arg::new("chatter_level")
                .long("chatter")
                .short('c')
                .value_name("LEVEL")
                .help("How much chatter to print when running")
                .value_parser(["default", "minimal"])
                .default_value("default"),
        )
    }
}

/// Run a function with colorized reporting of errors.
#[cfg(feature = "notifications")]
pub fn run_with_notifications<E, F>(matches: clap::ArgMatches, inner: F) -> i32
where
    E: Into<Error>,
    F: FnOnce(clap::ArgMatches, &mut dyn NotificationBackend) -> Result<i32, E>,
{
    let chatter = match matches
        .get_one::<String>("chatter_level")
        .map(|s| s.as_str())
    {
        Some("minimal") => ChatterLevel::Minimal,
        _ => ChatterLevel::Normal,
    };

    let mut tnb = self::termcolor::TermcolorNotificationBackend::new(chatter);

    match inner(matches, &mut tnb) {
        Ok(ret) => ret,

        Err(e) => {
            tnb.bare_error(e);
            1
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffering_then_drain() {
        let mut first = BufferingNotificationBackend::new();
        on_note!(first, "hello {}", 1);
        on_warning!(first, "missing {}", "VLTI"; anyhow::anyhow!("inner"));
        assert_eq!(first.len(), 2);

        let msgs: Vec<_> = first.messages().collect();
        assert_eq!(msgs[1], (NotificationKind::Warning, "missing VLTI"));

        let mut second = BufferingNotificationBackend::new();
        first.drain(&mut second);
        assert_eq!(second.len(), 2);
    }

    #[test]
    fn chatter_ordering() {
        assert!(ChatterLevel::Minimal < ChatterLevel::Normal);
    }
}
