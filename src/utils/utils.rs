/// u8_to_f32_vec reads a little-endian buffer of f32 values. A trailing
/// partial chunk is ignored.
pub fn u8_to_f32_vec(v: &[u8]) -> Vec<f32> {
    v.chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect()
}

#[cfg(test)]
mod tests {
    use crate::utils::utils::u8_to_f32_vec;

    #[test]
    fn test_u8_to_f32_vec() {
        let mut raw: Vec<u8> = Vec::new();
        raw.extend_from_slice(&0.25f32.to_le_bytes());
        raw.extend_from_slice(&(-1.5f32).to_le_bytes());
        raw.push(7);

        assert_eq!(u8_to_f32_vec(&raw), vec![0.25, -1.5]);
    }
}
