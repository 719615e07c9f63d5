use std::io;

pub struct TextReader<R: io::BufRead> {
    inner: R,
}

impl<R: io::BufRead> TextReader<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    pub fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        let len = self.inner.read_line(&mut line)?;
        if len == 0 {
            return Ok(None);
        }
        Ok(Some(line))
    }

    pub fn expect(&mut self, expected: &[u8]) -> io::Result<bool> {
        let mut real = vec![0; expected.len()];
        self.inner.read_exact(&mut real)?;
        Ok(real.eq(expected))
    }

    pub fn read_exact(&mut self, len: usize) -> io::Result<String> {
        let mut result = vec![0_u8; len];
        self.inner.read_exact(&mut result)?;
        Ok(String::from_utf8_lossy(&result).to_string())
    }

    pub fn try_read_exact(&mut self, len: usize) -> io::Result<Option<String>> {
        if self.inner.fill_buf()?.len() < len {
            return Ok(None);
        }
        self.read_exact(len).map(Some)
    }
}
