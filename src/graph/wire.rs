//! Wire format for packed region blobs
//!
//! A region tile travels as one length-delimited protobuf message. The wire
//! layout is a versioned external contract shared with the offline
//! generation pipeline; everything else in the crate goes through
//! [`crate::graph::region::Region::decode`] and never touches these types.

/// One 2°x2° tile worth of road data
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RegionBlob {
    #[prost(double, tag = "1")]
    pub min_lat: f64,
    #[prost(double, tag = "2")]
    pub min_lon: f64,
    #[prost(double, tag = "3")]
    pub max_lat: f64,
    #[prost(double, tag = "4")]
    pub max_lon: f64,
    #[prost(message, repeated, tag = "5")]
    pub ways: Vec<WayBlob>,
}

/// One road segment on the wire. Node latitudes and longitudes are parallel
/// packed arrays and must be the same length.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct WayBlob {
    #[prost(uint64, tag = "1")]
    pub id: u64,
    #[prost(string, tag = "2")]
    pub name: String,
    #[prost(string, tag = "3")]
    pub reference: String,
    #[prost(double, tag = "4")]
    pub max_speed: f64,
    #[prost(double, tag = "5")]
    pub advisory_speed: f64,
    #[prost(string, tag = "6")]
    pub hazard: String,
    #[prost(double, repeated, tag = "7")]
    pub node_lats: Vec<f64>,
    #[prost(double, repeated, tag = "8")]
    pub node_lons: Vec<f64>,
}
