//! Browser entry point.

use leptos::prelude::*;
use repo_viz::{App, init_logging};

fn main() {
	init_logging();
	mount_to_body(App);
}
