use agentos_rs_config::ShellConfig;
use agentos_rs_sandbox::{CommandGatekeeper, CommandPolicy};
use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use tokio::runtime::Runtime;

fn gatekeeper(working_directory: &std::path::Path) -> CommandGatekeeper {
    let config = ShellConfig {
        working_directory: working_directory.to_path_buf(),
        ..ShellConfig::default()
    };
    let policy = CommandPolicy::from_config(&config).expect("policy");
    CommandGatekeeper::new(policy).expect("gatekeeper")
}

fn bench_validate(criterion: &mut Criterion) {
    let dir = std::env::temp_dir().join("agentos_bench_validate");
    let gatekeeper = gatekeeper(&dir);
    let validator = gatekeeper.validator();

    criterion.bench_function("sandbox_validate_accept", |bencher| {
        bencher.iter(|| validator.validate(black_box("grep -n needle notes.txt")));
    });
    criterion.bench_function("sandbox_validate_reject", |bencher| {
        bencher.iter(|| validator.validate(black_box("ls -la && rm -rf /")));
    });
}

fn bench_execute_echo(criterion: &mut Criterion) {
    let dir = std::env::temp_dir().join("agentos_bench_execute");
    let gatekeeper = gatekeeper(&dir);
    let runtime = Runtime::new().expect("tokio runtime");

    criterion.bench_function("sandbox_execute_echo", |bencher| {
        bencher.iter(|| {
            runtime
                .block_on(gatekeeper.execute("echo ok", None))
                .expect("execute");
        });
    });
}

criterion_group!(sandbox_benches, bench_validate, bench_execute_echo);
criterion_main!(sandbox_benches);
