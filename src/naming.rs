//! Generated node names and passwords.

use rand::Rng;

/// Length of generated instance-user passwords.
pub const PASSWORD_LEN: usize = 36;

const ADJECTIVES: &[&str] = &[
    "agile", "amber", "bold", "brave", "brisk", "calm", "clever", "cosmic", "crimson", "daring",
    "eager", "fierce", "gentle", "golden", "happy", "humble", "jolly", "keen", "lively", "lucid",
    "mellow", "mighty", "noble", "patient", "proud", "quiet", "rapid", "serene", "sharp", "silent",
    "solid", "stoic", "sunny", "swift", "tidy", "vivid", "wise", "witty", "zesty",
];

const NOUNS: &[&str] = &[
    "archimedes", "babbage", "banach", "bohr", "boole", "curie", "darwin", "dijkstra", "euclid",
    "euler", "fermat", "feynman", "galois", "gauss", "hamilton", "hopper", "hypatia", "kepler",
    "lamarr", "lovelace", "maxwell", "meitner", "mendel", "newton", "noether", "pascal", "pasteur",
    "planck", "ramanujan", "riemann", "shannon", "tesla", "turing", "volta", "wozniak",
];

/// Generate a docker-style `adjective-noun` node name.
pub fn random_node_name<R: Rng>(rng: &mut R) -> String {
    let adjective = ADJECTIVES[rng.random_range(0..ADJECTIVES.len())];
    let noun = NOUNS[rng.random_range(0..NOUNS.len())];
    format!("{adjective}-{noun}")
}

/// Generate a [`PASSWORD_LEN`]-character alphanumeric password.
pub fn random_password<R: Rng>(rng: &mut R) -> String {
    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
    (0..PASSWORD_LEN)
        .map(|_| char::from(CHARSET[rng.random_range(0..CHARSET.len())]))
        .collect()
}
