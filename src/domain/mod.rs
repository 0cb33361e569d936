pub mod directory;
pub mod geo;
pub mod hours;
pub mod laundromat;
pub mod nearby;
pub mod subscription;
