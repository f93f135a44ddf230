//! Expansions of `runner_main!` as a test project would write them
//!
//! The generated `main` parses the process arguments, so these tests only
//! check that each form expands to an entry point with the right signature.

use std::process::ExitCode;

mod hooks_and_steps {
    use gauge_rust_runner::prelude::*;

    runner_main! {
        hooks: HookRegistry::builder()
            .after_suite(HookHandle::new("report", |_info: &ExecutionInfo| Ok(())))
            .build(),
        steps: StepRegistry::builder()
            .step(StepHandle::new("Say <greeting>", |_args: &[String]| Ok(())))
            .build(),
    }

    #[test]
    fn expands_to_main() {
        let entry: fn() -> super::ExitCode = main;
        let _ = entry;
    }
}

mod with_screen_grabber {
    use gauge_rust_runner::prelude::*;

    fn capture_png() -> Vec<u8> {
        vec![0x89, b'P', b'N', b'G']
    }

    runner_main! {
        hooks: HookRegistry::empty(),
        steps: StepRegistry::empty(),
        screen_grabber: || Some(capture_png()),
    }

    #[test]
    fn expands_to_main() {
        let entry: fn() -> super::ExitCode = main;
        let _ = entry;
    }
}
