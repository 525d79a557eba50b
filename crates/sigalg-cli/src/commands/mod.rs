pub mod decode;
pub mod info;
pub mod normalize;
pub mod sign;
pub mod verify;
