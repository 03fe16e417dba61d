use playground_types::RunResponse;

/// Incremental deframer for a stream of concatenated JSON objects.
///
/// Object boundaries are found by tracking brace depth outside string
/// literals, so chunks may split anywhere, including inside a multi-byte
/// character or an escape sequence.
#[derive(Debug, Default)]
pub struct JsonStreamParser {
    buffer: Vec<u8>,
    /// Offset of the next byte to scan.
    scanned: usize,
    /// Offset of the `{` opening the current object.
    start: Option<usize>,
    depth: usize,
    in_string: bool,
    escaped: bool,
}

impl JsonStreamParser {
    /// Feed arbitrary bytes into the parser and drain complete payloads.
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<RunResponse> {
        self.buffer.extend_from_slice(bytes);
        let mut responses = Vec::new();

        for index in self.scanned..self.buffer.len() {
            let byte = self.buffer[index];
            if self.in_string {
                if self.escaped {
                    self.escaped = false;
                } else if byte == b'\\' {
                    self.escaped = true;
                } else if byte == b'"' {
                    self.in_string = false;
                }
                continue;
            }

            match byte {
                b'"' if self.depth > 0 => self.in_string = true,
                b'{' => {
                    if self.depth == 0 {
                        self.start = Some(index);
                    }
                    self.depth += 1;
                }
                b'}' if self.depth > 0 => {
                    self.depth -= 1;
                    if self.depth == 0 {
                        if let Some(start) = self.start.take() {
                            if let Some(response) = decode_object(&self.buffer[start..=index]) {
                                responses.push(response);
                            }
                        }
                    }
                }
                _ => {}
            }
        }

        let consumed = self.start.unwrap_or(self.buffer.len());
        self.buffer.drain(..consumed);
        self.scanned = self.buffer.len();
        self.start = self.start.map(|_| 0);

        responses
    }

    /// Parse a complete payload string in one shot.
    pub fn parse_objects(input: &str) -> Vec<RunResponse> {
        let mut parser = Self::default();
        parser.feed(input.as_bytes())
    }

    /// True when no partial object is pending.
    pub fn is_empty_buffer(&self) -> bool {
        self.start.is_none()
    }
}

fn decode_object(bytes: &[u8]) -> Option<RunResponse> {
    match serde_json::from_slice::<RunResponse>(bytes) {
        Ok(response) => {
            tracing::trace!(event = response.event.as_str(), "decoded run payload");
            Some(response)
        }
        Err(error) => {
            tracing::warn!(%error, len = bytes.len(), "dropping malformed run payload");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use playground_types::RunEvent;

    use super::JsonStreamParser;

    #[test]
    fn buffers_partial_objects_between_feeds() {
        let mut parser = JsonStreamParser::default();
        assert!(parser.feed(br#"{"event":"RunStar"#).is_empty());
        assert!(!parser.is_empty_buffer());

        let responses = parser.feed(br#"ted","session_id":"s-1"}"#);
        assert_eq!(responses.len(), 1);
        assert_eq!(responses[0].event, RunEvent::RunStarted);
        assert!(parser.is_empty_buffer());
    }

    #[test]
    fn braces_inside_strings_do_not_split_objects() {
        let payload = r#"{"event":"RunResponseContent","content":"a } \"{ b"}"#;
        let responses = JsonStreamParser::parse_objects(payload);
        assert_eq!(responses.len(), 1);
        assert_eq!(
            responses[0].content,
            Some(serde_json::json!("a } \"{ b"))
        );
    }
}
