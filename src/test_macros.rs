#[macro_export]
macro_rules! reader_from_bytes {
    ($b : expr) => {{
        let buffer: &[u8] = $b.as_bytes();
        BufReader::new(buffer)
    }};
}

#[macro_export]
macro_rules! payloads {
    () => {{
        let batch: Vec<String> = vec![];
        batch
    }};
    ($p : expr; $n : expr) => {{
        let batch: Vec<String> = std::iter::repeat($p.to_string()).take($n).collect();
        batch
    }};
    ($($p : expr),+ $(,)?) => {{
        let batch: Vec<String> = vec![$($p.to_string()),+];
        batch
    }};
}
