pub mod block_producer;
pub mod user;

fn random_hex(len: usize) -> String {
    const HEX: &[u8] = b"0123456789abcdef";
    (0..len)
        .map(|_| HEX[(rand::random::<u8>() % 16) as usize] as char)
        .collect()
}
