#![no_main]

use libfuzzer_sys::fuzz_target;
use padlock_harness::{ModelWorld, Operation, RealWorld};

fuzz_target!(|ops: Vec<Operation>| {
    let mut model = ModelWorld::new();
    let mut real = RealWorld::new();

    for op in &ops {
        assert_eq!(model.apply(op), real.apply(op), "result diverged on {op:?}");
        assert_eq!(model.observable_state(), real.observable_state(), "state diverged on {op:?}");
        if let Some(open) = real.registry.opened() {
            assert!(real.registry.widgets_for(&open.peer).is_some());
        }
    }
});
