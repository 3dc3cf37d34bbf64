#[path = "build/config.rs"]
mod config;

use config::config::Cfgs;

fn main() {
    Cfgs::new().apply();
}
