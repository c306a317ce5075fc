#![cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]

mod config;
mod logging;
mod nav;
mod page;
mod reveal;
mod scroll;
mod site;
mod styles;
mod timing;
mod widgets;

#[cfg(test)]
mod fixture;

#[cfg(target_arch = "wasm32")]
mod frontend;

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    eprintln!("This project is frontend-only. Run `trunk serve` or `trunk build --release`.");
}

#[cfg(target_arch = "wasm32")]
fn main() {
    frontend::run();
}
