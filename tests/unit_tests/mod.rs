mod errors;
mod hgrad_tet_c2;
mod polynomials;
mod tags;
mod topology;
