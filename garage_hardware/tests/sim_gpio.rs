use garage_hardware::{HwError, SimulatedGpio};
use garage_traits::{Gpio, Level, PinMode};
use rstest::rstest;

#[rstest]
#[case(PinMode::Output(Level::High), Some(Level::High))]
#[case(PinMode::Output(Level::Low), Some(Level::Low))]
#[case(PinMode::InputPullDown, None)]
fn configure_sets_initial_output_level(#[case] mode: PinMode, #[case] expected: Option<Level>) {
    let mut gpio = SimulatedGpio::new();
    gpio.configure_pin(23, mode).unwrap();
    assert_eq!(gpio.mode(23), Some(mode));
    assert_eq!(gpio.output_level(23), expected);
}

#[rstest]
fn reading_an_output_is_a_typed_error() {
    let mut gpio = SimulatedGpio::new();
    gpio.configure_pin(17, PinMode::Output(Level::Low)).unwrap();
    let err = gpio.read_digital(17).unwrap_err();
    match err.downcast_ref::<HwError>() {
        Some(HwError::WrongMode { pin: 17, expected }) => assert_eq!(*expected, "input"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[rstest]
fn external_level_survives_reconfiguration() {
    let mut gpio = SimulatedGpio::new();
    gpio.set_input(22, Level::High);
    gpio.configure_pin(22, PinMode::InputPullDown).unwrap();
    assert_eq!(gpio.read_digital(22).unwrap(), Level::High);
}
