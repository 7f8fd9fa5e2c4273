// @generated
pub mod interchain_security {
    pub mod ccv {
        // @@protoc_insertion_point(attribute:interchain_security.ccv.v1)
        pub mod v1 {
            include!("gen/interchain_security.ccv.v1.rs");
            // @@protoc_insertion_point(interchain_security.ccv.v1)
        }
    }
}
pub mod ibc {
    pub mod core {
        pub mod client {
            // @@protoc_insertion_point(attribute:ibc.core.client.v1)
            pub mod v1 {
                include!("gen/ibc.core.client.v1.rs");
                // @@protoc_insertion_point(ibc.core.client.v1)
            }
        }
    }
    pub mod lightclients {
        pub mod tendermint {
            // @@protoc_insertion_point(attribute:ibc.lightclients.tendermint.v1)
            pub mod v1 {
                include!("gen/ibc.lightclients.tendermint.v1.rs");
                // @@protoc_insertion_point(ibc.lightclients.tendermint.v1)
            }
        }
    }
}
