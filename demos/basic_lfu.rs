use freqcache::store::CacheStore;

fn main() {
    let mut store: CacheStore<&str, String> = CacheStore::new(Some(2));

    store.put("a", "alpha".to_string());
    store.put("b", "beta".to_string());

    store.try_get(&"a");
    let evicted = store.put("c", "gamma".to_string());

    println!("contains a? {}", store.contains(&"a"));
    println!("contains b? {}", store.contains(&"b"));
    println!("evicted: {:?}", evicted.map(|(key, _)| key));
    println!("frequency of a: {:?}", store.frequency(&"a"));
}

// Expected output:
// contains a? true
// contains b? false
// evicted: Some("b")
// frequency of a: Some(2)
//
// Explanation: capacity=2; "a" is read before inserting "c", so "b" has the
// lowest count and is evicted.
