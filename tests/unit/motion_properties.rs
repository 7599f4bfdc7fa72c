//! Property tests for the planner and the step clock.

use proptest::prelude::*;

use stepper_axis::config::{ClockTiming, SystemLimits, STEP_UNIT};
use stepper_axis::motion::{plan_move, ArmCommand, ClockEvent, MotionRequest, StepClock};
use stepper_axis::{Direction, StepsPerSec, StepsPerSecSquared};

const MAX_TICKS: u64 = 20_000_000;

/// Move the clock to `start` at full limits, then reset nothing else.
fn clock_at(start: i32, limits: &SystemLimits, timing: &ClockTiming) -> StepClock {
    let mut clock = StepClock::new();
    if start != 0 {
        let request = MotionRequest::new(start, limits.max_speed, limits.max_accel);
        let profile = plan_move(0, &request, limits, timing).unwrap();
        clock.apply(ArmCommand::Move(profile));
        while clock.is_busy() {
            clock.tick();
        }
        clock.take_event();
    }
    clock
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn move_arrives_exactly_without_overshoot(
        start in -1500i32..1500,
        target in -1500i32..1500,
        speed in 200u32..20_000,
        accel in 500u32..100_000,
    ) {
        let limits = SystemLimits::new(20_000, 100_000).unwrap();
        let timing = ClockTiming::default();
        let mut clock = clock_at(start, &limits, &timing);

        let request = MotionRequest::new(target, StepsPerSec(speed), StepsPerSecSquared(accel));
        let profile = plan_move(start, &request, &limits, &timing).unwrap();
        if target == start {
            prop_assert!(profile.is_zero());
            return Ok(());
        }
        prop_assert!(clock.apply(ArmCommand::Move(profile)));

        let (lo, hi) = (start.min(target), start.max(target));
        let acc_before = clock.accumulator();
        let mut speed_sum: u128 = 0;
        let mut steps: u128 = 0;
        let mut ticks = 0u64;

        let event = loop {
            let tick = clock.tick();
            ticks += 1;
            prop_assert!(ticks < MAX_TICKS);

            let position = clock.position();
            prop_assert!(position >= lo && position <= hi, "overshoot to {}", position);
            prop_assert!(clock.speed() <= profile.speed_ceiling);
            prop_assert!(clock.accumulator() < STEP_UNIT);

            if let Some(event) = tick.event {
                break event;
            }
            prop_assert!(clock.speed() > 0, "stalled at {}", position);
            speed_sum += clock.speed() as u128;
            if let Some(direction) = tick.step {
                prop_assert_eq!(direction, profile.direction);
                steps += 1;
            }
        };

        prop_assert_eq!(event, ClockEvent::MoveComplete { position: target });
        prop_assert_eq!(clock.position(), target);
        prop_assert_eq!(steps, (target as i64 - start as i64).unsigned_abs() as u128);

        // no drift: every unit of speed is accounted for
        let carried = steps * STEP_UNIT as u128 + clock.accumulator() as u128;
        prop_assert_eq!(speed_sum + acc_before as u128, carried);
    }

    #[test]
    fn decel_trigger_matches_profile_shape(
        start in -100_000i32..100_000,
        distance in 1i32..100_000,
        forward in any::<bool>(),
        speed in 100u32..20_000,
        accel in 100u32..100_000,
    ) {
        let limits = SystemLimits::new(20_000, 100_000).unwrap();
        let timing = ClockTiming::default();
        let target = if forward { start + distance } else { start - distance };

        let request = MotionRequest::new(target, StepsPerSec(speed), StepsPerSecSquared(accel));
        let profile = plan_move(start, &request, &limits, &timing).unwrap();

        let direction = if forward { Direction::Forward } else { Direction::Reverse };
        prop_assert_eq!(profile.direction, direction);
        prop_assert_eq!(profile.distance, distance as u32);

        // v²/2a, slightly longer for the truncated per-tick acceleration
        let nominal = (speed as u64 * speed as u64) / (2 * accel as u64);
        let accel_distance = profile.accel_distance as u64;
        prop_assert!(accel_distance >= nominal);
        prop_assert!(accel_distance <= nominal + nominal / 100 + 2);

        let sign = direction.sign();
        if 2 * accel_distance >= distance as u64 {
            prop_assert!(profile.triangular);
            prop_assert_eq!(profile.decel_at as i64, start as i64 + sign * (distance as i64 / 2));
        } else {
            prop_assert!(!profile.triangular);
            prop_assert_eq!(profile.decel_at as i64, target as i64 - sign * accel_distance as i64);
        }

        prop_assert!(profile.speed_floor >= profile.accel_per_tick.min(profile.speed_ceiling));
        prop_assert!(profile.speed_floor <= profile.speed_ceiling);
        prop_assert!(profile.speed_floor > 0);
    }
}
