use galois_rs::ReedSolomon;
use rand::Rng;

fn main() {
    let k = 6;
    let m = 3;
    let vector_len = 4096;

    let rs = ReedSolomon::new(k, m).expect("valid (k, m)");

    let mut rng = rand::rng();
    let original: Vec<Vec<u8>> = (0..k).map(|_| (0..vector_len).map(|_| rng.random()).collect()).collect();

    let mut stripe: Vec<Vec<u8>> = original.clone();
    stripe.extend((0..m).map(|_| vec![0u8; vector_len]));
    {
        let mut refs: Vec<&mut [u8]> = stripe.iter_mut().map(|v| v.as_mut_slice()).collect();
        rs.encode(&mut refs).expect("encode");
    }

    println!("encoded {k} data vectors into {m} parity vectors of {vector_len} bytes each");

    // lose three data vectors.
    let lost = [0usize, 2, 5];
    for &i in &lost {
        stripe[i] = vec![0u8; vector_len];
    }

    let survived: Vec<usize> = (0..k + m).filter(|i| !lost.contains(i)).collect();
    {
        let mut refs: Vec<&mut [u8]> = stripe.iter_mut().map(|v| v.as_mut_slice()).collect();
        rs.reconst(&mut refs, &survived, &lost).expect("reconst");
    }

    for (i, original_vector) in original.iter().enumerate() {
        assert_eq!(&stripe[i], original_vector);
    }
    println!("reconstructed vectors {lost:?} from {} survivors", survived.len());
}
