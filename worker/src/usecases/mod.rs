pub mod expire_access;
