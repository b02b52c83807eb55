//! End-to-end door scenarios on simulated pins and virtual time.
//!
//! Timings with the shared rig: polls every 250 ms from t=0, press halves
//! of 300 ms, 10 s movement, so a 2 s grace after pressing from an endpoint.

mod common;

use common::{BUTTON, Door, POWER, Rig, ms};
use garage_core::{DoorState, HubEvent, RequestOutcome, TargetState};
use garage_traits::Level;
use rstest::rstest;

#[rstest]
#[case(Door::Open, DoorState::Open, TargetState::Open)]
#[case(Door::Closed, DoorState::Closed, TargetState::Closed)]
#[case(Door::Between, DoorState::Stopped, TargetState::Open)]
fn initial_state_is_seeded_without_notifying(
    #[case] door: Door,
    #[case] state: DoorState,
    #[case] target: TargetState,
) {
    let rig = Rig::new(door);
    assert_eq!(rig.ctl.current_state(), state);
    assert_eq!(rig.ctl.target_state(), target);
    assert!(rig.hub.events().is_empty());
}

#[rstest]
fn pins_are_configured_at_start_and_released_on_shutdown() {
    let mut rig = Rig::new(Door::Closed);
    assert_eq!(rig.world.output_level(BUTTON), Some(Level::Low));
    assert_eq!(rig.world.output_level(POWER), Some(Level::High));

    rig.ctl.shutdown().unwrap();
    assert_eq!(rig.world.output_level(BUTTON), Some(Level::Low));
    assert_eq!(rig.world.output_level(POWER), Some(Level::Low));
    assert_eq!(rig.ctl.next_deadline(), None);
}

// Scenario A
#[rstest]
fn open_from_closed_presses_once_and_settles_on_movement_timer() {
    let mut rig = Rig::new(Door::Closed).settled();
    assert_eq!(rig.now_ms(), 1000);

    let rx = rig.ctl.request_set(TargetState::Open);
    assert_eq!(
        rx.try_recv(),
        Ok(RequestOutcome::Pressed {
            from: DoorState::Closed,
            to: DoorState::Opening
        })
    );
    assert_eq!(rig.ctl.current_state(), DoorState::Opening);
    assert_eq!(rig.ctl.target_state(), TargetState::Open);
    assert_eq!(rig.world.output_level(BUTTON), Some(Level::High));
    assert!(rig.ctl.is_processing());

    // door leaves the closed switch
    rig.place(Door::Between);

    rig.advance(ms(300));
    assert_eq!(rig.world.output_level(BUTTON), Some(Level::Low));
    assert!(rig.ctl.is_processing());

    rig.advance(ms(300));
    assert!(!rig.ctl.is_processing());
    assert!(rig.ctl.in_grace());
    assert!(rig.ctl.movement_pending());

    rig.advance(ms(2000));
    assert!(!rig.ctl.in_grace());

    // still travelling just before the movement timer is due
    rig.advance(ms(7900));
    assert_eq!(rig.now_ms(), 11_500);
    assert_eq!(rig.ctl.current_state(), DoorState::Opening);

    rig.place(Door::Open);
    rig.advance(ms(100));
    assert_eq!(rig.ctl.current_state(), DoorState::Open);
    assert!(!rig.ctl.movement_pending());

    assert_eq!(rig.presses(), 1);
    assert_eq!(rig.hub.target_pushes(), vec![TargetState::Open]);
    assert_eq!(
        rig.hub.current_pushes(),
        vec![DoorState::Opening, DoorState::Open]
    );
}

#[rstest]
fn reaching_an_endpoint_early_cancels_the_movement_timer() {
    let mut rig = Rig::new(Door::Closed).settled();
    rig.ctl.request_set(TargetState::Open);
    rig.place(Door::Between);
    rig.advance(ms(5000));
    assert_eq!(rig.ctl.current_state(), DoorState::Opening);

    rig.place(Door::Open);
    // three of four polls must agree
    rig.advance(ms(750));
    assert_eq!(rig.ctl.current_state(), DoorState::Open);
    assert!(!rig.ctl.movement_pending());
}

#[rstest]
fn grace_period_hides_sensors_that_have_not_moved_yet() {
    let mut rig = Rig::new(Door::Closed).settled();
    rig.ctl.request_set(TargetState::Open);

    // door never moves; grace runs from 1600 to 3600
    rig.advance(ms(2500));
    assert_eq!(rig.now_ms(), 3500);
    assert_eq!(rig.ctl.current_state(), DoorState::Opening);

    rig.advance(ms(250));
    assert_eq!(rig.ctl.current_state(), DoorState::Closed);
    assert_eq!(rig.ctl.target_state(), TargetState::Closed);
    assert!(!rig.ctl.movement_pending());
}

// Scenario B
#[rstest]
fn physical_press_from_open_is_inferred_after_majority() {
    let mut rig = Rig::new(Door::Open).settled();
    rig.place(Door::Between);

    rig.advance(ms(700));
    assert_eq!(rig.ctl.current_state(), DoorState::Open);

    rig.advance(ms(50));
    assert_eq!(rig.now_ms(), 1750);
    assert_eq!(rig.ctl.current_state(), DoorState::Closing);
    assert_eq!(rig.ctl.target_state(), TargetState::Closed);
    assert!(rig.ctl.movement_pending());
    assert_eq!(rig.presses(), 0);

    rig.place(Door::Closed);
    rig.advance(ms(750));
    assert_eq!(rig.ctl.current_state(), DoorState::Closed);
    assert!(!rig.ctl.movement_pending());
}

#[rstest]
fn inferred_movement_that_never_arrives_ends_stopped() {
    let mut rig = Rig::new(Door::Open).settled();
    rig.place(Door::Between);
    rig.advance(ms(750));
    assert_eq!(rig.ctl.current_state(), DoorState::Closing);

    // movement timer armed at 1750
    rig.advance(ms(9999));
    assert_eq!(rig.ctl.current_state(), DoorState::Closing);
    rig.advance(ms(1));
    assert_eq!(rig.ctl.current_state(), DoorState::Stopped);
    assert_eq!(rig.ctl.target_state(), TargetState::Open);
}

#[rstest]
fn physical_press_from_closed_is_inferred_as_opening() {
    let mut rig = Rig::new(Door::Closed).settled();
    rig.place(Door::Between);
    rig.advance(ms(750));
    assert_eq!(rig.ctl.current_state(), DoorState::Opening);
    assert!(rig.ctl.movement_pending());
}

#[rstest]
fn press_from_stopped_heads_for_closing_without_grace() {
    let mut rig = Rig::new(Door::Open).settled();
    rig.place(Door::Between);
    rig.advance(ms(750 + 10_000));
    assert_eq!(rig.ctl.current_state(), DoorState::Stopped);

    rig.ctl.request_set(TargetState::Closed);
    assert_eq!(rig.ctl.current_state(), DoorState::Closing);
    assert!(!rig.ctl.in_grace());
}

#[rstest]
fn single_glitch_does_not_flip_state() {
    let mut rig = Rig::new(Door::Closed).settled();
    rig.place(Door::Open);
    rig.advance(ms(250));
    rig.place(Door::Closed);
    rig.advance(ms(2000));
    assert_eq!(rig.ctl.current_state(), DoorState::Closed);
    assert!(rig.hub.events().is_empty());
}

// Scenario D
#[rstest]
fn queued_duplicate_is_evaluated_after_first_completes() {
    let mut rig = Rig::new(Door::Closed).settled();

    let first = rig.ctl.request_set(TargetState::Open);
    let second = rig.ctl.request_set(TargetState::Open);
    assert!(first.try_recv().is_ok());
    assert!(second.try_recv().is_err());
    assert_eq!(rig.ctl.queued(), 2);

    rig.advance(ms(599));
    assert!(second.try_recv().is_err());

    rig.advance(ms(1));
    assert_eq!(
        second.try_recv(),
        Ok(RequestOutcome::AlreadySatisfied {
            state: DoorState::Opening
        })
    );
    assert_eq!(rig.ctl.queued(), 0);
    assert!(!rig.ctl.is_processing());
    assert_eq!(rig.presses(), 1);
}

#[rstest]
fn reversing_mid_press_stops_the_door_without_a_movement_timer() {
    let mut rig = Rig::new(Door::Closed).settled();

    rig.ctl.request_set(TargetState::Open);
    let second = rig.ctl.request_set(TargetState::Closed);

    rig.advance(ms(600));
    assert_eq!(
        second.try_recv(),
        Ok(RequestOutcome::Pressed {
            from: DoorState::Opening,
            to: DoorState::Stopped
        })
    );
    assert_eq!(rig.ctl.current_state(), DoorState::Stopped);
    assert_eq!(rig.ctl.target_state(), TargetState::Open);
    assert!(!rig.ctl.movement_pending());
    assert!(rig.ctl.is_processing());

    rig.advance(ms(600));
    assert!(!rig.ctl.is_processing());
    assert!(!rig.ctl.movement_pending());
    assert_eq!(rig.presses(), 2);
}

#[rstest]
fn satisfied_request_completes_immediately_without_pressing() {
    let mut rig = Rig::new(Door::Closed).settled();
    let rx = rig.ctl.request_set(TargetState::Closed);
    assert_eq!(
        rx.try_recv(),
        Ok(RequestOutcome::AlreadySatisfied {
            state: DoorState::Closed
        })
    );
    assert_eq!(rig.presses(), 0);
    assert!(!rig.ctl.is_processing());
    assert_eq!(rig.ctl.queued(), 0);

    rig.advance(ms(5000));
    assert_eq!(rig.presses(), 0);
    assert!(rig.hub.events().is_empty());
}

#[rstest]
fn hub_sees_each_change_once() {
    let mut rig = Rig::new(Door::Open).settled();
    rig.ctl.request_set(TargetState::Closed);
    rig.place(Door::Between);
    rig.advance(ms(10_600));
    assert_eq!(
        rig.hub.events(),
        vec![
            HubEvent::Current(DoorState::Closing),
            HubEvent::Target(TargetState::Closed),
            HubEvent::Current(DoorState::Stopped),
            HubEvent::Target(TargetState::Open),
        ]
    );
}
