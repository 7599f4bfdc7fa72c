//! Line console.
//!
//! Runs parsed commands against the controller and writes one-line replies
//! to any [`core::fmt::Write`] sink. The ready prompt is written whenever
//! the axis is left idle.

use core::fmt::{self, Write};

use embedded_hal::digital::OutputPin;

use crate::error::{Result, StorageError};
use crate::motor::{MotionController, Notification};
use crate::storage::{load_settings, save_settings, SettingsStore};

use super::parser::{parse, Command};

/// Ready prompt.
pub const PROMPT: &str = "> ";

/// Help text for `?`.
pub const HELP: &str = "\
Commands:
  0                       set origin here
  S                       stop
  D / E                   disable / enable driver
  H [speed] [accel]       home to 0
  M dest [speed] [accel]  move to position
  J [+1|-1] [speed]       jog; J alone stops
  I                       position and limits
  G                       run program
  P                       print program
  C                       clear program
  L line dest rate accel  set program line (rate 0: dwell dest ms, 0 0: end)
  R speed                 set max speed
  A accel                 set max acceleration
  V                       save settings
  ?                       this help
";

enum Reply {
    Done,
    Notify(Notification),
    Info,
    Listing,
    Help,
    Saved,
}

/// Command console over a controller and a settings store.
pub struct Console<'a, EN: OutputPin, S: SettingsStore> {
    controller: MotionController<'a, EN>,
    store: S,
}

impl<'a, EN: OutputPin, S: SettingsStore> Console<'a, EN, S> {
    /// Create a console.
    pub fn new(controller: MotionController<'a, EN>, store: S) -> Self {
        Self { controller, store }
    }

    /// Load saved settings into the controller.
    ///
    /// Returns why the saved settings were not used, if they weren't; the
    /// controller then keeps its configured defaults.
    pub fn load(&mut self) -> Result<Option<StorageError>> {
        let loaded = load_settings(&mut self.store, self.controller.settings());
        self.controller.restore(loaded.settings)?;
        Ok(loaded.fallback)
    }

    /// The controller.
    pub fn controller(&self) -> &MotionController<'a, EN> {
        &self.controller
    }

    /// The controller, mutably.
    pub fn controller_mut(&mut self) -> &mut MotionController<'a, EN> {
        &mut self.controller
    }

    /// The settings store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Split into controller and store.
    pub fn into_parts(self) -> (MotionController<'a, EN>, S) {
        (self.controller, self.store)
    }

    /// Execute one input line. Blank lines are ignored.
    pub fn execute<W: Write>(&mut self, line: &str, out: &mut W) -> fmt::Result {
        let reply = match parse(line) {
            Ok(None) => return Ok(()),
            Ok(Some(command)) => self.run(command),
            Err(e) => Err(e),
        };

        match reply {
            Ok(reply) => self.write_reply(reply, out)?,
            Err(e) => writeln!(out, "{}", e)?,
        }
        self.prompt(out)
    }

    /// Same as a `G` command; for the start switch.
    pub fn start_program<W: Write>(&mut self, out: &mut W) -> fmt::Result {
        self.execute("G", out)
    }

    /// Report any completion from the clock. Call from the foreground loop.
    pub fn poll<W: Write>(&mut self, out: &mut W) -> fmt::Result {
        if let Some(notification) = self.controller.poll() {
            self.write_reply(Reply::Notify(notification), out)?;
            self.prompt(out)?;
        }
        Ok(())
    }

    fn run(&mut self, command: Command) -> Result<Reply> {
        let ctrl = &mut self.controller;
        match command {
            Command::SetOrigin => ctrl.set_origin()?,
            Command::Stop => {
                ctrl.stop();
            }
            Command::Disable => ctrl.disable()?,
            Command::Enable => ctrl.enable()?,
            Command::Home { speed, accel } => {
                ctrl.home(speed, accel)?;
            }
            Command::Move {
                destination,
                speed,
                accel,
            } => {
                ctrl.move_to(destination, speed, accel)?;
            }
            Command::Jog {
                direction: Some(direction),
                speed,
            } => {
                ctrl.jog(direction, speed)?;
            }
            Command::Jog {
                direction: None, ..
            } => {
                ctrl.stop_jog();
            }
            Command::Info => return Ok(Reply::Info),
            Command::Go => {
                if let Some(notification) = ctrl.start_program()? {
                    return Ok(Reply::Notify(notification));
                }
            }
            Command::Print => return Ok(Reply::Listing),
            Command::Clear => ctrl.clear_program(),
            Command::SetLine { line, entry } => {
                ctrl.set_line(line, entry)?;
            }
            Command::SetMaxSpeed(value) => ctrl.set_max_speed(value)?,
            Command::SetMaxAccel(value) => ctrl.set_max_accel(value)?,
            Command::Save => {
                save_settings(&mut self.store, &self.controller.settings())?;
                return Ok(Reply::Saved);
            }
            Command::Help => return Ok(Reply::Help),
        }
        Ok(Reply::Done)
    }

    fn write_reply<W: Write>(&self, reply: Reply, out: &mut W) -> fmt::Result {
        match reply {
            Reply::Done => Ok(()),
            Reply::Notify(Notification::MoveComplete { .. }) => Ok(()),
            Reply::Notify(Notification::ProgramComplete { .. }) => {
                writeln!(out, "Program complete")
            }
            Reply::Notify(Notification::ProgramAborted { line }) => {
                writeln!(out, "Program stopped at line {}", line)
            }
            Reply::Info => {
                let limits = self.controller.limits();
                writeln!(
                    out,
                    "Position: {} Max speed: {} Max accel: {}",
                    self.controller.position(),
                    limits.max_speed.0,
                    limits.max_accel.0
                )
            }
            Reply::Listing => self.controller.program().write_listing(out),
            Reply::Help => out.write_str(HELP),
            Reply::Saved => writeln!(out, "Settings saved"),
        }
    }

    fn prompt<W: Write>(&self, out: &mut W) -> fmt::Result {
        if self.controller.state().is_idle() {
            out.write_str(PROMPT)?;
        }
        Ok(())
    }
}
