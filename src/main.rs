//! kioskclock main entrypoint.

use kioskclock::run;

fn main() {
    if let Err(e) = run() {
        kioskclock::ui::messages::error(format!("Error: {e}"));
        std::process::exit(1);
    }
}
