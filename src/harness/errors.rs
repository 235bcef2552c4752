use abd::AbdError;
use abd::ReplicaError;

quick_error! {
    /// HarnessError is a failed check of the replicas or of the register.
    #[derive(Debug)]
    pub enum HarnessError {
        /// A check failed. The message names the offending replicas.
        Check(msg: String) {
            display("{}", msg)
        }

        Abd(e: AbdError) {
            from(e: AbdError) -> (e)
            display("{}", e)
        }

        Replica(e: ReplicaError) {
            from(e: ReplicaError) -> (e)
            display("{}", e)
        }
    }
}
