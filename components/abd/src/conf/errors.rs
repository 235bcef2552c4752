quick_error! {
    #[derive(Debug)]
    pub enum ConfError {
        IOError(e: std::io::Error) {
            from(e: std::io::Error) -> (e)
            display("{}", e)
        }

        BadYaml(e: serde_yaml::Error) {
            from(e: serde_yaml::Error) -> (e)
            display("bad yaml: {}", e)
        }

        NoReplica {
            display("no replica configured")
        }

        BadEndpoint(endpoint: String) {
            display("bad endpoint: {:?}", endpoint)
        }

        DupReplica(endpoint: String) {
            display("duplicated replica: {}", endpoint)
        }
    }
}

impl PartialEq<ConfError> for ConfError {
    fn eq(&self, other: &ConfError) -> bool {
        match (self, other) {
            (Self::IOError(a), Self::IOError(b)) => a.kind() == b.kind(),
            (Self::BadYaml(_), Self::BadYaml(_)) => true,
            (Self::NoReplica, Self::NoReplica) => true,
            (Self::BadEndpoint(a), Self::BadEndpoint(b)) => a == b,
            (Self::DupReplica(a), Self::DupReplica(b)) => a == b,
            _ => false,
        }
    }
}
