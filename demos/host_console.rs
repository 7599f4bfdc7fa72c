//! Host console example.
//!
//! Runs the controller against simulated pins: a background thread plays
//! the timer interrupt, stdin plays the serial port. Pass a TOML config
//! path as the first argument to override the defaults. A line holding just
//! `!` presses and releases the start switch.
//!
//! ```text
//! cargo run --example host_console -- axis.toml
//! ```

use std::io::{self, BufRead, Write as _};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use stepper_axis::storage::FileStore;
use stepper_axis::{
    load_config, Console, ControllerConfig, DriverEnable, MotionController, SharedClock,
    StartSwitch, StepOutputs,
};

static CLOCK: SharedClock = SharedClock::new();
static STEPS: AtomicU32 = AtomicU32::new(0);
static RUNNING: AtomicBool = AtomicBool::new(true);
static SWITCH_PRESSED: AtomicBool = AtomicBool::new(false);

/// Simulated output pin.
struct SimPin {
    name: &'static str,
    state: bool,
    counts_edges: bool,
}

impl SimPin {
    fn new(name: &'static str, counts_edges: bool) -> Self {
        Self {
            name,
            state: false,
            counts_edges,
        }
    }
}

impl embedded_hal::digital::ErrorType for SimPin {
    type Error = core::convert::Infallible;
}

impl embedded_hal::digital::OutputPin for SimPin {
    fn set_high(&mut self) -> Result<(), Self::Error> {
        if self.counts_edges && !self.state {
            STEPS.fetch_add(1, Ordering::Relaxed);
        }
        self.state = true;
        Ok(())
    }

    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.state = false;
        Ok(())
    }
}

impl Drop for SimPin {
    fn drop(&mut self) {
        if !self.counts_edges {
            println!("{} pin left {}", self.name, if self.state { "high" } else { "low" });
        }
    }
}

/// Simulated start switch wired with the configured polarity. A press
/// lasts for one read.
struct SimSwitch {
    active_low: bool,
}

impl SimSwitch {
    fn level_high(&self) -> bool {
        SWITCH_PRESSED.swap(false, Ordering::Relaxed) != self.active_low
    }
}

impl embedded_hal::digital::ErrorType for SimSwitch {
    type Error = core::convert::Infallible;
}

impl embedded_hal::digital::InputPin for SimSwitch {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(self.level_high())
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Ok(!self.level_high())
    }
}

fn main() {
    println!("=== stepper-axis host console ===\n");

    let config = match std::env::args().nth(1) {
        Some(path) => match load_config(&path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("{}: {}", path, e);
                return;
            }
        },
        None => ControllerConfig::default(),
    };
    let tick_rate = config.tick_rate_hz;
    println!("Tick rate: {} Hz", tick_rate);

    // Timer interrupt stand-in: one batch of ticks per millisecond.
    let ticks_per_ms = (tick_rate / 1000).max(1);
    let ticker = thread::spawn(move || {
        let mut outputs = StepOutputs::new(SimPin::new("STEP", true), SimPin::new("DIR", false), false);
        while RUNNING.load(Ordering::Relaxed) {
            for _ in 0..ticks_per_ms {
                let tick = CLOCK.tick();
                if let Err(e) = outputs.apply(&tick) {
                    eprintln!("pin error: {}", e);
                }
            }
            thread::sleep(Duration::from_millis(1));
        }
    });

    let controller = match MotionController::new(
        &CLOCK,
        DriverEnable::new(SimPin::new("EN", false), true),
        &config,
    ) {
        Ok(controller) => controller,
        Err(e) => {
            eprintln!("{}", e);
            return;
        }
    };

    let mut start_switch = StartSwitch::from_config(
        SimSwitch {
            active_low: config.start_switch_active_low,
        },
        &config,
    );

    let store = FileStore::new(std::env::temp_dir().join("stepper-axis-settings.bin"));
    let mut console = Console::new(controller, store);
    match console.load() {
        Ok(None) => println!("Loaded saved settings"),
        Ok(Some(reason)) => println!("Using defaults ({})", reason),
        Err(e) => println!("Could not restore settings: {}", e),
    }

    // Serial port stand-in.
    let (lines_tx, lines_rx) = mpsc::channel::<String>();
    thread::spawn(move || {
        for line in io::stdin().lock().lines().map_while(Result::ok) {
            if lines_tx.send(line).is_err() {
                break;
            }
        }
    });

    let mut out = String::from(stepper_axis::command::PROMPT);
    loop {
        match lines_rx.try_recv() {
            Ok(line) if line.trim() == "!" => SWITCH_PRESSED.store(true, Ordering::Relaxed),
            Ok(line) => {
                let _ = console.execute(&line, &mut out);
            }
            Err(mpsc::TryRecvError::Empty) => {}
            Err(mpsc::TryRecvError::Disconnected) => break,
        }
        if let Ok(true) = start_switch.poll() {
            let _ = console.start_program(&mut out);
        }
        let _ = console.poll(&mut out);

        if !out.is_empty() {
            print!("{}", out);
            let _ = io::stdout().flush();
            out.clear();
        }
        thread::sleep(Duration::from_millis(2));
    }

    RUNNING.store(false, Ordering::Relaxed);
    let _ = ticker.join();
    println!(
        "\nFinal position: {} ({} steps emitted)",
        console.controller().position(),
        STEPS.load(Ordering::Relaxed)
    );
}
