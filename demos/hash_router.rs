//! Hash router walking through a small movie app

use heropy::router::{MemoryHistory, RenderOutcome};
use heropy::{create_router, Component, Route};
use tracing_subscriber::EnvFilter;

struct Home {
    el: String,
}

impl Component for Home {
    type Element = String;

    fn create() -> Self {
        Self {
            el: "<h1>Movie search</h1>".to_string(),
        }
    }

    fn into_el(self) -> String {
        self.el
    }
}

struct NotFound;

impl Component for NotFound {
    type Element = String;

    fn create() -> Self {
        NotFound
    }

    fn into_el(self) -> String {
        "<h1>Sorry..</h1>".to_string()
    }
}

fn main() -> Result<(), heropy::router::RouterError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== Hash Router Example ===\n");

    let install = create_router(vec![
        Route::component::<Home>("^/"),
        Route::new("^/movie", || "<h1>Movie details</h1>".to_string()),
        Route::new("^/about", || "<h1>About</h1>".to_string()),
        Route::component::<NotFound>(".*"),
    ])?;

    println!("1. Installing at a location without a fragment");
    let mut router = install.install(MemoryHistory::new("/"), Some(Vec::<String>::new()));
    report(router.state().outcome.clone(), router.mount());
    println!("   location: {}", router.navigation().current().url);

    println!("\n2. Following links");
    for url in ["#/movie?id=tt0076759&plot=full", "#/about", "#/nowhere"] {
        let state = router.navigate(url).clone();
        println!("   {url} -> hash {} query {:?}", state.hash, state.query);
        report(state.outcome, router.mount());
    }

    println!("\n3. Going back");
    while router.back() {
        println!("   at {}", router.navigation().current().url);
        report(router.state().outcome.clone(), router.mount());
    }

    println!("\n✓ Example complete!");
    Ok(())
}

fn report(outcome: RenderOutcome, view: Option<&Vec<String>>) {
    match outcome {
        RenderOutcome::Mounted { path, .. } => println!("   matched {path}: {:?}", view),
        RenderOutcome::Cleared => println!("   nothing matched, view cleared"),
        RenderOutcome::Detached => println!("   no mount point"),
    }
}
