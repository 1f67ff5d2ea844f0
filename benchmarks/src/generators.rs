use rand::{distributions::{Bernoulli, Uniform}, Rng};
use blockquery::BLOCK_BYTES;

/// Bit array of `blocks` 64-byte blocks where each bit is set with
/// probability `density / 1000`.
pub fn gen_bit_array<R: Rng>(rng: &mut R, blocks: u16, density: u32) -> Result<Vec<u8>, String> {
    let p = (density.min(1000)) as f64 / 1000.0;
    let bit = Bernoulli::new(p).map_err(|e| e.to_string())?;

    let bits = (0..blocks as usize * BLOCK_BYTES)
        .map(|_| (0..8).fold(0u8, |byte, i| byte | ((rng.sample(&bit) as u8) << i)))
        .collect();
    Ok(bits)
}

/// `count` index sequences of length `len`, uniform over `blocks`.
pub fn gen_queries<R: Rng>(rng: &mut R, blocks: u16, len: usize, count: usize) -> Result<Vec<Vec<u16>>, String> {
    if blocks == 0 {
        return Err("cannot generate queries over an empty bit array".to_string());
    }
    let dist = Uniform::from(0..blocks);

    Ok((0..count)
        .map(|_| (0..len).map(|_| rng.sample(&dist)).collect())
        .collect())
}
