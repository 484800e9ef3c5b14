use scrub_core::{process, Paths};

fn main() {
    let paths = Paths::new();

    println!("=== Process ===");
    println!("uid: {}", process::current_uid());
    println!("euid: {}", process::effective_uid());
    println!("sudo caller: {:?}", process::sudo_caller());

    println!("\n=== Locations ===");
    println!("home: {}", paths.home.display());
    println!("spaces file: {}", paths.spaces_file().display());

    println!("\n=== Default Spaces ===");
    let catalog = paths.catalog();
    for space in catalog.default_spaces() {
        println!("{}: {}", space.display(), space.exists());
    }

    println!("\n=== Application Directories ===");
    for dir in catalog.applications() {
        println!("{}: {}", dir.display(), dir.exists());
    }
}
