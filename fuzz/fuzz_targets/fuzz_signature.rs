#![no_main]

use std::sync::mpsc;
use std::sync::Mutex;
use std::sync::OnceLock;
use std::time::Duration;

use libfuzzer_sys::fuzz_target;
use nova_generics::{ClassKind, ClassStore, ResolutionContext};
use nova_generics_signature::SignatureLoader;

mod utils;

const TIMEOUT: Duration = Duration::from_secs(1);

struct Runner {
    input_tx: mpsc::SyncSender<String>,
    output_rx: Mutex<mpsc::Receiver<()>>,
}

fn run_one(text: &str) {
    let _ = nova_generics_signature::parse_field_signature(text);
    let _ = nova_generics_signature::parse_method_signature(text);

    // Signatures that load must also resolve without panicking, whatever they declare.
    let mut store = ClassStore::with_minimal_jdk();
    let mut loader = SignatureLoader::new(&mut store);
    let Ok(class) = loader.define_class("fuzz.Target", ClassKind::Class, text) else {
        return;
    };
    let Ok(ctx) = ResolutionContext::new(&store, class) else {
        return;
    };
    for ancestor in ctx.ancestors().collect::<Vec<_>>() {
        let _ = ctx.ancestor_type(&store, ancestor);
    }
}

fn runner() -> &'static Runner {
    static RUNNER: OnceLock<Runner> = OnceLock::new();
    RUNNER.get_or_init(|| {
        let (input_tx, input_rx) = mpsc::sync_channel::<String>(0);
        let (output_tx, output_rx) = mpsc::sync_channel::<()>(0);

        std::thread::spawn(move || {
            for input in input_rx {
                run_one(&input);
                let _ = output_tx.send(());
            }
        });

        Runner {
            input_tx,
            output_rx: Mutex::new(output_rx),
        }
    })
}

fuzz_target!(|data: &[u8]| {
    let Some(text) = utils::truncate_utf8(data) else {
        return;
    };

    let runner = runner();
    runner
        .input_tx
        .send(text.to_string())
        .expect("fuzz_signature worker thread exited");

    match runner
        .output_rx
        .lock()
        .expect("fuzz_signature worker receiver poisoned")
        .recv_timeout(TIMEOUT)
    {
        Ok(()) => {}
        Err(mpsc::RecvTimeoutError::Timeout) => panic!("fuzz_signature fuzz target timed out"),
        Err(mpsc::RecvTimeoutError::Disconnected) => {
            panic!("fuzz_signature worker thread panicked")
        }
    }
});
