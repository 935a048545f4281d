// Address helpers — host:port handling for transport addresses

/// Join a host and port into `host:port`, bracketing IPv6 hosts
pub fn join_host_port(host: &str, port: u16) -> String {
    if host.contains(':') {
        format!("[{}]:{}", host, port)
    } else {
        format!("{}:{}", host, port)
    }
}

/// Whether `s` ("host", "host:port", "ipv6::address" or "[ipv6::address]:port")
/// already carries a port
pub fn has_port(s: &str) -> bool {
    // IPv6 address in brackets
    if s.rfind('[') == Some(0) {
        return s.rfind(':') > s.rfind(']');
    }

    // A bare IPv6 address has several colons and cannot carry a port
    s.matches(':').count() == 1
}

/// Append `port` to `s` unless it already has one
pub fn ensure_port(s: &str, port: u16) -> String {
    if has_port(s) {
        return s.to_string();
    }

    // join_host_port adds the brackets back
    join_host_port(s.trim_matches(|c| c == '[' || c == ']'), port)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_host_port() {
        assert_eq!(join_host_port("127.0.0.1", 7946), "127.0.0.1:7946");
        assert_eq!(join_host_port("node-a.local", 80), "node-a.local:80");
        assert_eq!(join_host_port("::1", 7946), "[::1]:7946");
    }

    #[test]
    fn test_has_port() {
        let cases = [
            ("", false),
            ("1.2.3.4", false),
            ("1.2.3.4:80", true),
            ("localhost", false),
            ("localhost:80", true),
            ("2600:1f14:e22:1501:f9a:2e0c:a167:67e8", false),
            ("[2600:1f14:e22:1501:f9a:2e0c:a167:67e8]", false),
            ("[2600:1f14:e22:1501:f9a:2e0c:a167:67e8]:80", true),
            ("[::1]:7946", true),
        ];

        for (input, expected) in cases {
            assert_eq!(has_port(input), expected, "input {:?}", input);
        }
    }

    #[test]
    fn test_ensure_port() {
        let cases = [
            ("1.2.3.4", "1.2.3.4:8301"),
            ("1.2.3.4:1234", "1.2.3.4:1234"),
            ("localhost", "localhost:8301"),
            (
                "2600:1f14:e22:1501:f9a:2e0c:a167:67e8",
                "[2600:1f14:e22:1501:f9a:2e0c:a167:67e8]:8301",
            ),
            (
                "[2600:1f14:e22:1501:f9a:2e0c:a167:67e8]",
                "[2600:1f14:e22:1501:f9a:2e0c:a167:67e8]:8301",
            ),
            (
                "[2600:1f14:e22:1501:f9a:2e0c:a167:67e8]:1234",
                "[2600:1f14:e22:1501:f9a:2e0c:a167:67e8]:1234",
            ),
        ];

        for (input, expected) in cases {
            assert_eq!(ensure_port(input, 8301), expected, "input {:?}", input);
        }
    }
}
