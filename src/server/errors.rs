use tokio::task::JoinError;

quick_error! {
    #[derive(Debug, PartialEq)]
    pub enum ServerError {
        NotStarted {
            display("server is not started")
        }

        RxClosed {
            display("server already stopped")
        }

        BadAddr(addr: String) {
            display("bad listen address: {}", addr)
        }

        Transport(msg: String) {
            from(err: tonic::transport::Error) -> (format!("{}", err))
            from(err: JoinError) -> (format!("{}", err))
            display("transport error: {}", msg)
        }
    }
}
