use super::*;
use crate::virtual_machine::isa::Opcode;
use crate::virtual_machine::listener::Reactive;

fn program(text: &str) -> Program {
    Program::parse(text).expect("program parse failed")
}

fn run_vm(text: &str) -> VM {
    let mut vm = VM::new(&program(text), ExecConfig::default());
    vm.run(&mut InputQueue::default()).expect("vm run failed");
    vm
}

fn final_memory(text: &str) -> Vec<i64> {
    run_vm(text).memory().to_vec()
}

fn outputs(text: &str, inputs: &[i64]) -> Vec<i64> {
    run_with_inputs(&program(text), inputs.iter().copied()).expect("vm run failed")
}

fn run_expect_err(text: &str, inputs: &[i64]) -> VMError {
    run_with_inputs(&program(text), inputs.iter().copied()).expect_err("expected error")
}

fn growable() -> ExecConfig {
    ExecConfig::default().with_memory(MemoryPolicy::growable())
}

// ==================== Arithmetic ====================

#[test]
fn position_mode_add() {
    assert_eq!(final_memory("1,0,0,0,99"), vec![2, 0, 0, 0, 99]);
}

#[test]
fn position_mode_multiply() {
    assert_eq!(final_memory("2,3,0,3,99"), vec![2, 3, 0, 6, 99]);
    assert_eq!(final_memory("2,4,4,5,99,0"), vec![2, 4, 4, 5, 99, 9801]);
}

#[test]
fn self_modifying_program() {
    assert_eq!(
        final_memory("1,1,1,4,99,5,6,0,99"),
        vec![30, 1, 1, 4, 2, 5, 6, 0, 99]
    );
    assert_eq!(
        final_memory("1,9,10,3,2,3,11,0,99,30,40,50"),
        vec![3500, 9, 10, 70, 2, 3, 11, 0, 99, 30, 40, 50]
    );
}

#[test]
fn mixed_immediate_and_position_multiply() {
    assert_eq!(final_memory("1002,4,3,4,33"), vec![1002, 4, 3, 4, 99]);
}

#[test]
fn immediate_operands_with_negative_literal() {
    assert_eq!(final_memory("1101,100,-1,4,0")[4], 99);
}

#[test]
fn arithmetic_wraps_at_64_bits() {
    let memory = final_memory("1101,9223372036854775807,1,0,99");
    assert_eq!(memory[0], i64::MIN);
}

#[test]
fn execution_is_deterministic() {
    let text = "1,9,10,3,2,3,11,0,99,30,40,50";
    assert_eq!(final_memory(text), final_memory(text));
}

// ==================== I/O ====================

#[test]
fn outputs_large_literal() {
    assert_eq!(outputs("104,1125899906842624,99", &[]), vec![1125899906842624]);
}

#[test]
fn outputs_sixteen_digit_product() {
    let out = outputs("1102,34915192,34915192,7,4,7,99,0", &[]);
    assert_eq!(out, vec![1_219_070_632_396_864]);
}

#[test]
fn echo_round_trip() {
    assert_eq!(outputs("3,0,4,0,99", &[7]), vec![7]);
}

#[test]
fn listener_sees_outputs_in_order() {
    let text = "104,1,104,2,104,3,99";
    let mut listener = InputQueue::default();
    let returned = run(&program(text), &mut listener).unwrap();
    assert_eq!(returned, vec![1, 2, 3]);
    assert_eq!(listener.outputs(), returned.as_slice());
}

#[test]
fn reactive_listener_drives_loop() {
    // Reads x; halts on 0, otherwise outputs 2x and loops.
    let text = "3,20,1006,20,14,1002,20,2,21,4,21,1105,1,0,99,0,0,0,0,0,0,0";
    let mut listener = Reactive::new(|seen: &[i64]| {
        Ok(if seen.len() < 3 {
            seen.last().copied().unwrap_or(1)
        } else {
            0
        })
    });
    let out = run(&program(text), &mut listener).unwrap();
    assert_eq!(out, vec![2, 4, 8]);
}

#[test]
fn input_exhausted() {
    assert!(matches!(
        run_expect_err("3,0,3,0,99", &[1]),
        VMError::InputExhausted
    ));
}

#[test]
fn listener_errors_abort_run() {
    struct Rejecting;
    impl Listener for Rejecting {
        fn on_read_requested(&mut self) -> Result<i64, VMError> {
            Ok(0)
        }
        fn on_store_requested(&mut self, _value: i64) -> Result<(), VMError> {
            Err(VMError::Listener("unexpected store".into()))
        }
    }

    let mut vm = VM::new(&program("104,5,104,6,99"), ExecConfig::default());
    assert!(matches!(
        vm.run(&mut Rejecting),
        Err(VMError::Listener(msg)) if msg == "unexpected store"
    ));
    assert_eq!(vm.outputs(), &[5]);
    assert!(!vm.is_halted());
}

#[test]
fn answer_is_last_output() {
    assert_eq!(run_for_answer(&program("104,1,104,42,99"), std::iter::empty()).unwrap(), 42);
    assert!(matches!(
        run_for_answer(&program("99"), std::iter::empty()),
        Err(VMError::NoOutput)
    ));
}

// ==================== Comparison and jumps ====================

#[test]
fn equals_and_less_than() {
    // Position mode: input == 8, input < 8.
    assert_eq!(outputs("3,9,8,9,10,9,4,9,99,-1,8", &[8]), vec![1]);
    assert_eq!(outputs("3,9,8,9,10,9,4,9,99,-1,8", &[7]), vec![0]);
    assert_eq!(outputs("3,9,7,9,10,9,4,9,99,-1,8", &[5]), vec![1]);
    assert_eq!(outputs("3,9,7,9,10,9,4,9,99,-1,8", &[8]), vec![0]);
    // Immediate mode.
    assert_eq!(outputs("3,3,1108,-1,8,3,4,3,99", &[8]), vec![1]);
    assert_eq!(outputs("3,3,1107,-1,8,3,4,3,99", &[9]), vec![0]);
}

#[test]
fn jumps_select_branch() {
    let position = "3,12,6,12,15,1,13,14,13,4,13,99,-1,0,1,9";
    assert_eq!(outputs(position, &[0]), vec![0]);
    assert_eq!(outputs(position, &[5]), vec![1]);

    let immediate = "3,3,1105,-1,9,1101,0,0,12,4,12,99,1";
    assert_eq!(outputs(immediate, &[0]), vec![0]);
    assert_eq!(outputs(immediate, &[-3]), vec![1]);
}

#[test]
fn compare_against_eight() {
    let text = "3,21,1008,21,8,20,1005,20,22,107,8,21,20,1006,20,31,\
                1106,0,36,98,0,0,1002,21,125,20,4,20,1105,1,46,104,\
                999,1105,1,46,1101,1000,1,20,4,20,1105,1,46,98,99";
    assert_eq!(outputs(text, &[7]), vec![999]);
    assert_eq!(outputs(text, &[8]), vec![1000]);
    assert_eq!(outputs(text, &[9]), vec![1001]);
}

#[test]
fn jump_cursor_invariants() {
    let mut listener = InputQueue::default();

    // Taken: cursor becomes the target.
    let mut vm = VM::new(&program("1105,1,4,0,99"), ExecConfig::default());
    assert_eq!(vm.step(&mut listener).unwrap(), Status::Running);
    assert_eq!(vm.ip(), 4);

    // Not taken: cursor advances by 3.
    let mut vm = VM::new(&program("1105,0,4,99,99"), ExecConfig::default());
    vm.step(&mut listener).unwrap();
    assert_eq!(vm.ip(), 3);

    let mut vm = VM::new(&program("1106,0,4,0,99"), ExecConfig::default());
    vm.step(&mut listener).unwrap();
    assert_eq!(vm.ip(), 4);

    let mut vm = VM::new(&program("1106,7,4,99,99"), ExecConfig::default());
    vm.step(&mut listener).unwrap();
    assert_eq!(vm.ip(), 3);
}

#[test]
fn jump_to_negative_address() {
    assert!(matches!(
        run_expect_err("1105,1,-4,99", &[]),
        VMError::InvalidAddress { address: -4, .. }
    ));
}

// ==================== Relative base ====================

#[test]
fn relative_base_offsets_accesses() {
    // rb = 10, rb -= 3, [rb+5] = 5 + 6, output [rb+5].
    let vm = run_vm("109,10,109,-3,21101,5,6,5,204,5,99,0,0");
    assert_eq!(vm.relative_base(), 7);
    assert_eq!(vm.memory()[12], 11);
    assert_eq!(vm.outputs(), &[11]);
}

#[test]
fn relative_mode_input() {
    let out = outputs("109,7,203,0,204,0,99,0", &[-12]);
    assert_eq!(out, vec![-12]);
}

#[test]
fn quine_needs_growable_memory() {
    let text = "109,1,204,-1,1001,100,1,100,1008,100,16,101,1006,101,0,99";
    assert!(matches!(
        run_expect_err(text, &[]),
        VMError::InvalidAddress { address: 100, capacity: 16 }
    ));

    let mut vm = VM::new(&program(text), growable());
    let out = vm.run(&mut InputQueue::default()).unwrap();
    assert_eq!(out, program(text).words());
}

// ==================== Errors ====================

#[test]
fn unsupported_opcode() {
    assert!(matches!(
        run_expect_err("1,0,0,0,42", &[]),
        VMError::UnsupportedOpcode { opcode: 42, ip: 4 }
    ));
}

#[test]
fn immediate_destination_rejected() {
    assert!(matches!(
        run_expect_err("11101,1,1,0,99", &[]),
        VMError::ImmediateDestination { ip: 0, operand: 3 }
    ));
}

#[test]
fn running_off_the_end() {
    assert!(matches!(
        run_expect_err("1101,1,1,0", &[]),
        VMError::InvalidAddress { address: 4, capacity: 4 }
    ));
}

#[test]
fn write_out_of_bounds() {
    assert!(matches!(
        run_expect_err("1101,1,1,9,99", &[]),
        VMError::InvalidAddress { address: 9, capacity: 5 }
    ));
}

// ==================== Stepping and limits ====================

#[test]
fn step_reports_halt_and_stays_halted() {
    let mut listener = InputQueue::default();
    let mut vm = VM::new(&program("1101,2,3,0,99"), ExecConfig::default());
    assert_eq!(vm.step(&mut listener).unwrap(), Status::Running);
    assert_eq!(vm.memory()[0], 5);
    assert_eq!(vm.step(&mut listener).unwrap(), Status::Halted);
    assert!(vm.is_halted());
    assert_eq!(vm.ip(), 4);
    assert_eq!(vm.step(&mut listener).unwrap(), Status::Halted);
    assert_eq!(vm.stats().total(), 2);
}

#[test]
fn step_limit_stops_infinite_loop() {
    let config = ExecConfig::default().with_step_limit(10);
    let mut vm = VM::new(&program("1105,1,0"), config);
    assert!(matches!(
        vm.run(&mut InputQueue::default()),
        Err(VMError::StepLimitExceeded { limit: 10 })
    ));
    assert_eq!(vm.stats().total(), 10);
}

#[test]
fn stats_count_opcodes() {
    let vm = run_vm("1101,1,1,0,104,3,1101,1,1,0,99");
    assert_eq!(vm.stats().count(Opcode::Add), 2);
    assert_eq!(vm.stats().count(Opcode::Output), 1);
    assert_eq!(vm.stats().count(Opcode::Halt), 1);
    assert_eq!(vm.stats().total(), 4);
}

#[test]
fn vms_do_not_share_memory() {
    let text = "3,0,4,0,99";
    let prog = program(text);
    let mut a = VM::new(&prog, ExecConfig::default());
    let mut b = VM::new(&prog, ExecConfig::default());
    a.run(&mut InputQueue::new([1])).unwrap();
    b.run(&mut InputQueue::new([2])).unwrap();
    assert_eq!(a.memory()[0], 1);
    assert_eq!(b.memory()[0], 2);
    assert_eq!(prog.words()[0], 3);
}
