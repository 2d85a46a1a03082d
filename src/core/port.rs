use crate::utils::error::{Result, SidecarError};
use std::net::{IpAddr, Ipv4Addr, SocketAddr, TcpListener, ToSocketAddrs};

/// 已綁定的 listener，之後交給 health server 使用
#[derive(Debug)]
pub struct BoundPort {
    pub host: String,
    pub listener: TcpListener,
}

impl BoundPort {
    pub fn port(&self) -> u16 {
        self.listener.local_addr().map(|a| a.port()).unwrap_or_default()
    }

    /// 綁定的 host 是否代表所有介面
    pub fn is_wildcard(&self) -> bool {
        is_wildcard_host(&self.host)
    }
}

pub fn is_wildcard_host(host: &str) -> bool {
    match host.trim() {
        "" => true,
        h => h
            .trim_start_matches('[')
            .trim_end_matches(']')
            .parse::<IpAddr>()
            .map(|ip| ip.is_unspecified())
            .unwrap_or(false),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PortAllocator {
    /// 外部指定的 host/port，綁定失敗即致命
    Fixed { host: String, port: u16 },
    /// 在 `[start, end)` 依序找第一個能綁定的 port
    Range { host: String, start: u16, end: u16 },
}

impl PortAllocator {
    pub fn allocate(&self) -> Result<BoundPort> {
        match self {
            PortAllocator::Fixed { host, port } => {
                let listener = bind(host, *port).map_err(|source| SidecarError::BindError {
                    address: format!("{}:{}", display_host(host), port),
                    source,
                })?;
                tracing::debug!("Bound fixed port {}:{}", display_host(host), port);
                Ok(BoundPort {
                    host: host.clone(),
                    listener,
                })
            }
            PortAllocator::Range { host, start, end } => {
                for port in *start..*end {
                    match bind(host, port) {
                        Ok(listener) => {
                            tracing::debug!("Found free port {}:{}", display_host(host), port);
                            return Ok(BoundPort {
                                host: host.clone(),
                                listener,
                            });
                        }
                        Err(e) => tracing::trace!("Port {} unavailable: {}", port, e),
                    }
                }
                Err(SidecarError::NoFreePort {
                    start: *start,
                    end: *end,
                })
            }
        }
    }
}

fn display_host(host: &str) -> &str {
    if host.is_empty() {
        "0.0.0.0"
    } else {
        host
    }
}

fn bind(host: &str, port: u16) -> std::io::Result<TcpListener> {
    if host.is_empty() {
        return TcpListener::bind(SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), port));
    }
    let addrs: Vec<SocketAddr> = (host, port).to_socket_addrs()?.collect();
    TcpListener::bind(addrs.as_slice())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wildcard_hosts() {
        assert!(is_wildcard_host(""));
        assert!(is_wildcard_host("0.0.0.0"));
        assert!(is_wildcard_host("::"));
        assert!(is_wildcard_host("[::]"));
        assert!(!is_wildcard_host("127.0.0.1"));
        assert!(!is_wildcard_host("node1.example.com"));
    }

    #[test]
    fn test_fixed_port_binds_exactly() {
        let probe = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = probe.local_addr().unwrap().port();
        drop(probe);

        let bound = PortAllocator::Fixed {
            host: "127.0.0.1".to_string(),
            port,
        }
        .allocate()
        .unwrap();
        assert_eq!(bound.port(), port);
        assert!(!bound.is_wildcard());
    }

    #[test]
    fn test_fixed_port_in_use_is_an_error() {
        let taken = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = taken.local_addr().unwrap().port();

        let result = PortAllocator::Fixed {
            host: "127.0.0.1".to_string(),
            port,
        }
        .allocate();
        assert!(matches!(result, Err(SidecarError::BindError { .. })));
    }

    #[test]
    fn test_empty_range_is_an_error() {
        let result = PortAllocator::Range {
            host: "127.0.0.1".to_string(),
            start: 5000,
            end: 5000,
        }
        .allocate();
        assert!(matches!(result, Err(SidecarError::NoFreePort { .. })));
    }
}
