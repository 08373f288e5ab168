//! Basic example of `shelf_life` usage. Stores a few entries in a small
//! cache and shows least-recently-used eviction and age-based expiry.

use std::thread;
use std::time::Duration;

use shelf_life::Cache;

fn main() {
    let mut cache = Cache::with_limits(2, Duration::from_millis(50));

    cache.insert("alpha", 1);
    cache.insert("beta", 2);

    // Reading "alpha" makes "beta" the least recently used entry.
    println!("alpha = {:?}", cache.get(&"alpha"));

    // The cache is full, so this evicts "beta".
    cache.insert("gamma", 3);
    println!("beta after eviction = {:?}", cache.get(&"beta"));
    println!("gamma = {:?}", cache.get(&"gamma"));

    // After the maximum age passes, the survivors expire as well.
    thread::sleep(Duration::from_millis(60));
    println!("alpha after expiry = {:?}", cache.get(&"alpha"));
    println!("entries remaining: {}", cache.len());
}
