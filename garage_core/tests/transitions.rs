mod common;

use common::{Door, Rig};
use garage_core::{DoorState, RequestOutcome, TargetState};
use rstest::rstest;

#[rstest]
#[case(DoorState::Open, DoorState::Closing)]
#[case(DoorState::Closed, DoorState::Opening)]
#[case(DoorState::Opening, DoorState::Stopped)]
#[case(DoorState::Closing, DoorState::Opening)]
#[case(DoorState::Stopped, DoorState::Closing)]
fn button_press_table(#[case] from: DoorState, #[case] to: DoorState) {
    assert_eq!(from.after_press(), to);
}

#[rstest]
#[case(TargetState::Closed, DoorState::Closed, true)]
#[case(TargetState::Closed, DoorState::Closing, true)]
#[case(TargetState::Closed, DoorState::Open, false)]
#[case(TargetState::Closed, DoorState::Opening, false)]
#[case(TargetState::Closed, DoorState::Stopped, false)]
#[case(TargetState::Open, DoorState::Open, true)]
#[case(TargetState::Open, DoorState::Opening, true)]
#[case(TargetState::Open, DoorState::Closed, false)]
#[case(TargetState::Open, DoorState::Closing, false)]
#[case(TargetState::Open, DoorState::Stopped, false)]
fn satisfies_target(#[case] target: TargetState, #[case] state: DoorState, #[case] ok: bool) {
    assert_eq!(target.is_satisfied_by(state), ok);
}

#[rstest]
fn target_is_closed_only_for_closed_or_closing() {
    for s in DoorState::ALL {
        let closed = matches!(s, DoorState::Closed | DoorState::Closing);
        assert_eq!(TargetState::derived_from(s) == TargetState::Closed, closed, "{s}");
    }
}

#[rstest]
#[case(DoorState::Open, 0)]
#[case(DoorState::Closed, 1)]
#[case(DoorState::Opening, 2)]
#[case(DoorState::Closing, 3)]
#[case(DoorState::Stopped, 4)]
fn homekit_codes(#[case] s: DoorState, #[case] code: u8) {
    assert_eq!(s.hap_code(), code);
}

#[rstest]
#[case(Door::Open, TargetState::Closed, DoorState::Closing, true)]
#[case(Door::Closed, TargetState::Open, DoorState::Opening, true)]
#[case(Door::Between, TargetState::Closed, DoorState::Closing, false)]
fn controller_applies_table_on_request(
    #[case] door: Door,
    #[case] target: TargetState,
    #[case] expected: DoorState,
    #[case] grace: bool,
) {
    let mut rig = Rig::new(door).settled();
    let from = rig.ctl.current_state();
    let rx = rig.ctl.request_set(target);
    assert_eq!(
        rx.try_recv(),
        Ok(RequestOutcome::Pressed { from, to: expected })
    );
    assert_eq!(rig.ctl.current_state(), expected);

    rig.advance(common::ms(600));
    assert_eq!(rig.ctl.in_grace(), grace);
    assert!(rig.ctl.movement_pending());
}
