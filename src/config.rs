use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address both listeners bind to. Supplied explicitly or discovered
    /// from the local network interfaces at startup.
    pub host: IpAddr,
    /// Port for the general file exchange service.
    pub port: u16,
    /// Port for the admin service (server namespace only).
    pub admin_port: u16,
    pub data_dir: PathBuf,
}

impl ServerConfig {
    #[must_use]
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    #[must_use]
    pub fn admin_socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.admin_port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::from([127, 0, 0, 1]),
            port: 8080,
            admin_port: 8090,
            data_dir: PathBuf::from("./data"),
        }
    }
}
