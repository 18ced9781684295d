extern crate diffspline;

use diffspline::{interp, InterpOptions};
use nalgebra::DMatrix;

fn main() {

    let x_cp = [1.0, 2.0, 4.0, 6.0, 10.0, 12.0];
    let y_cp = DMatrix::from_row_slice(1, 6, &[5.0, 12.0, 14.0, 16.0, 21.0, 29.0]);

    let x_min = 0.0;
    let x_max = 13.0;
    let number_of_steps = 65;
    let step = (x_max - x_min) / number_of_steps as f64;

    let mut x_vector = Vec::new();
    for i in 0..=number_of_steps {
        x_vector.push(x_min + step * i as f64);
    }

    let options = InterpOptions::new().set("delta_x", 0.1);
    let (exact, _) = interp("akima", &x_cp, &y_cp, &x_vector, &InterpOptions::new()).unwrap();
    let (smoothed, _) = interp("akima", &x_cp, &y_cp, &x_vector, &options).unwrap();

    println!("x;y;y_smoothed");
    for i in 0..=number_of_steps {
        println!("{:.2};{:.4};{:.4}", x_vector[i], exact[(0, i)], smoothed[(0, i)]);
    }
}
