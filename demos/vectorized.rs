extern crate diffspline;

use diffspline::{Inputs, InterpOptions, SplineComponent};
use nalgebra::DMatrix;

fn main() {

    let x_cp = [1.0, 2.0, 4.0, 6.0, 10.0, 12.0];
    let y_cp = DMatrix::from_row_slice(
        2,
        6,
        &[5.0, 12.0, 14.0, 16.0, 21.0, 29.0, 7.0, 13.0, 9.0, 6.0, 12.0, 14.0],
    );
    let temperature_cp = DMatrix::from_row_slice(
        2,
        6,
        &[1.0, 5.0, 7.0, 8.0, 13.0, 16.0, 16.0, 13.0, 8.0, 7.0, 5.0, 1.0],
    );

    let number_of_steps = 44;
    let x_vector: Vec<f64> = (0..=number_of_steps)
        .map(|i| 1.0 + 11.0 * i as f64 / number_of_steps as f64)
        .collect();

    let mut comp = SplineComponent::new("akima", &x_cp, &x_vector, &InterpOptions::new())
        .unwrap()
        .with_vec_size(2)
        .unwrap()
        .with_x_interp_name("x_val")
        .with_x_units("km");
    comp.add_spline_with_units("alt_cp", "alt", Some(y_cp), "kft").unwrap();
    comp.add_spline_with_units("temp_cp", "temp", Some(temperature_cp), "degC").unwrap();

    let outputs = comp.evaluate(&Inputs::new()).unwrap();
    let alt = outputs.value("alt").unwrap();
    let temp = outputs.value("temp").unwrap();

    println!("x;alt_0;alt_1;temp_0;temp_1");
    for (i, x) in x_vector.iter().enumerate() {
        println!("{:.2};{:.4};{:.4};{:.4};{:.4}", x, alt[(0, i)], alt[(1, i)], temp[(0, i)], temp[(1, i)]);
    }

    let jacobian = outputs.partials("alt", "alt_cp").unwrap();
    println!("d alt / d alt_cp: {:?} ({} blocks)", jacobian.shape(), jacobian.vec_size());
}
